//! Main-axis solver and rectangle placement.

use super::{Alignment, Orientation, SlotSpec, Size};
use crate::types::Rect;

/// Distribute `main` cells among `sizes` separated by `gap`.
///
/// Returns one length per entry. Arithmetic is done in `u32` so large fixed
/// sizes or gaps saturate instead of wrapping. Lengths are not clamped here;
/// [`split`] clamps positions against the parent area.
pub fn solve(main: u16, sizes: &[Size], gap: u16) -> Vec<u16> {
    let count = sizes.len() as u32;
    if count == 0 {
        return Vec::new();
    }

    let gaps = gap as u32 * (count - 1);
    let fixed: u32 = sizes
        .iter()
        .map(|s| match s {
            Size::Fixed(n) => *n as u32,
            Size::Proportional(_) => 0,
        })
        .sum();
    let remaining = (main as u32).saturating_sub(fixed).saturating_sub(gaps);
    let total_weight: u32 = sizes.iter().filter_map(Size::weight).sum();
    let last_proportional = sizes.iter().rposition(|s| s.weight().is_some());

    let mut out = Vec::with_capacity(sizes.len());
    let mut given = 0u32;
    for (i, size) in sizes.iter().enumerate() {
        let len = match size {
            Size::Fixed(n) => *n as u32,
            Size::Proportional(_) if Some(i) == last_proportional => remaining - given,
            Size::Proportional(_) => {
                let weight = size.weight().unwrap_or(1);
                let share = remaining as u64 * weight as u64 / total_weight as u64;
                given += share as u32;
                share as u32
            }
        };
        out.push(len.min(u16::MAX as u32) as u16);
    }
    out
}

/// Split `area` into one rect per slot.
///
/// Hidden slots get a zero-area rect at the area origin. Slots that fall past
/// the end of the main axis are clamped; a slot with no room left collapses to
/// zero length at the far edge.
pub fn split(
    area: Rect,
    slots: &[SlotSpec],
    orientation: Orientation,
    gap: u16,
    alignment: Alignment,
) -> Vec<Rect> {
    let active: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.visible)
        .map(|(i, _)| i)
        .collect();
    let sizes: Vec<Size> = active.iter().map(|&i| slots[i].size).collect();

    // Areas reaching past the last addressable cell are cut at u16::MAX
    let (main_start, main_end, cross_start, cross_end) = match orientation {
        Orientation::Horizontal => (area.x, area.right(), area.y, area.bottom()),
        Orientation::Vertical => (area.y, area.bottom(), area.x, area.right()),
    };
    let main_len = main_end - main_start;
    let cross_len = cross_end - cross_start;
    let lengths = solve(main_len, &sizes, gap);
    let main_end = main_end as u32;

    let mut rects = vec![Rect::empty_at(area.x, area.y); slots.len()];
    let mut cursor = main_start as u32;
    for (&index, &len) in active.iter().zip(lengths.iter()) {
        let start = cursor.min(main_end);
        let clamped = (len as u32).min(main_end - start);
        cursor = cursor.saturating_add(len as u32).saturating_add(gap as u32);

        let preferred = slots[index].measured.map(|(w, h)| match orientation {
            Orientation::Horizontal => h,
            Orientation::Vertical => w,
        });
        let (offset, extent) = place_cross(cross_len, preferred, alignment);
        let pos = start as u16;
        let len = clamped as u16;
        let cross_pos = cross_start + offset;

        rects[index] = match orientation {
            Orientation::Horizontal => Rect::new(pos, cross_pos, len, extent),
            Orientation::Vertical => Rect::new(cross_pos, pos, extent, len),
        };
    }
    rects
}

/// Cross-axis (offset, extent) for one slot.
fn place_cross(cross_len: u16, preferred: Option<u16>, alignment: Alignment) -> (u16, u16) {
    let Some(preferred) = preferred else {
        return (0, cross_len);
    };
    let extent = preferred.min(cross_len);
    match alignment {
        Alignment::Stretch => (0, cross_len),
        Alignment::Start => (0, extent),
        Alignment::Center => ((cross_len - extent) / 2, extent),
        Alignment::End => (cross_len - extent, extent),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn widths(rects: &[Rect]) -> Vec<u16> {
        rects.iter().map(|r| r.width).collect()
    }

    fn horizontal(width: u16, slots: &[SlotSpec], gap: u16) -> Vec<Rect> {
        split(Rect::new(0, 0, width, 4), slots, Orientation::Horizontal, gap, Alignment::Stretch)
    }

    #[test]
    fn test_fixed_proportional_fixed() {
        let slots = [
            SlotSpec::new(Size::Fixed(5)),
            SlotSpec::new(Size::Proportional(1)),
            SlotSpec::new(Size::Fixed(5)),
        ];
        let rects = horizontal(21, &slots, 1);
        assert_eq!(widths(&rects), vec![5, 9, 5]);
        assert_eq!(rects[1].x, 6);
        assert_eq!(rects[2].x, 16);
        assert!(rects.iter().all(|r| r.height == 4));
    }

    #[test]
    fn test_remainder_goes_to_last_proportional() {
        assert_eq!(
            solve(10, &[Size::Proportional(1), Size::Proportional(1), Size::Proportional(1)], 0),
            vec![3, 3, 4]
        );
        // Trailing fixed slot does not receive the remainder
        assert_eq!(
            solve(11, &[Size::Proportional(1), Size::Proportional(1), Size::Fixed(2)], 0),
            vec![4, 5, 2]
        );
    }

    #[test]
    fn test_weights() {
        assert_eq!(solve(12, &[Size::Proportional(1), Size::Proportional(2)], 0), vec![4, 8]);
        // Zero weight counts as one
        assert_eq!(solve(10, &[Size::Proportional(0), Size::Proportional(1)], 0), vec![5, 5]);
    }

    #[test]
    fn test_default_size_is_proportional_one() {
        assert_eq!(Size::default(), Size::Proportional(1));
        assert_eq!(SlotSpec::default().size, Size::Proportional(1));
    }

    #[test]
    fn test_overflow_collapses_to_zero() {
        let slots = [SlotSpec::new(Size::Fixed(8)), SlotSpec::new(Size::Fixed(8))];
        let rects = horizontal(10, &slots, 0);
        assert_eq!(rects[0], Rect::new(0, 0, 8, 4));
        assert_eq!(rects[1], Rect::new(8, 0, 2, 4));

        let rects = horizontal(4, &slots, 2);
        assert_eq!(rects[0].width, 4);
        assert_eq!(rects[1].width, 0);
        assert_eq!(rects[1].x, 4);
    }

    #[test]
    fn test_area_at_coordinate_limit() {
        let slots = [SlotSpec::default(), SlotSpec::default()];
        let area = Rect::new(65000, 0, 1000, 1);
        let rects = split(area, &slots, Orientation::Horizontal, 0, Alignment::Stretch);
        assert_eq!(rects[0], Rect::new(65000, 0, 267, 1));
        assert_eq!(rects[1], Rect::new(65267, 0, 268, 1));

        let rects = split(Rect::new(0, 65530, 3, 100), &slots, Orientation::Vertical, 2, Alignment::Stretch);
        assert!(rects.iter().all(|r| r.y >= 65530));
    }

    #[test]
    fn test_proportional_starved() {
        let slots = [SlotSpec::new(Size::Fixed(10)), SlotSpec::default()];
        let rects = horizontal(6, &slots, 0);
        assert_eq!(widths(&rects), vec![6, 0]);
    }

    #[test]
    fn test_hidden_slots_take_no_space() {
        let slots = [
            SlotSpec::default(),
            SlotSpec::new(Size::Fixed(4)).hidden(),
            SlotSpec::default(),
        ];
        let rects = horizontal(11, &slots, 1);
        assert_eq!(widths(&rects), vec![5, 0, 5]);
        assert_eq!(rects[2].x, 6);
        assert!(rects[1].is_empty());
    }

    #[test]
    fn test_vertical_with_offset_area() {
        let slots = [SlotSpec::new(Size::Fixed(1)), SlotSpec::default()];
        let rects = split(Rect::new(3, 2, 10, 8), &slots, Orientation::Vertical, 0, Alignment::Stretch);
        assert_eq!(rects[0], Rect::new(3, 2, 10, 1));
        assert_eq!(rects[1], Rect::new(3, 3, 10, 7));
    }

    #[test]
    fn test_cross_alignment() {
        let area = Rect::new(0, 0, 10, 9);
        let slots = [SlotSpec::default().with_measured(4, 3)];
        let at = |alignment| split(area, &slots, Orientation::Horizontal, 0, alignment)[0];

        assert_eq!(at(Alignment::Stretch), Rect::new(0, 0, 10, 9));
        assert_eq!(at(Alignment::Start), Rect::new(0, 0, 10, 3));
        assert_eq!(at(Alignment::Center), Rect::new(0, 3, 10, 3));
        assert_eq!(at(Alignment::End), Rect::new(0, 6, 10, 3));

        // Vertical layouts align on width
        let rect = split(area, &slots, Orientation::Vertical, 0, Alignment::End)[0];
        assert_eq!(rect, Rect::new(6, 0, 4, 9));

        // No measurement falls back to stretch
        let unmeasured = [SlotSpec::default()];
        let rect = split(area, &unmeasured, Orientation::Horizontal, 0, Alignment::Center)[0];
        assert_eq!(rect, area);
    }

    #[test]
    fn test_empty_slots() {
        assert!(solve(10, &[], 3).is_empty());
        assert!(horizontal(10, &[], 1).is_empty());
    }

    fn size_strategy() -> impl Strategy<Value = Size> {
        prop_oneof![
            (0u16..20).prop_map(Size::Fixed),
            (0u16..5).prop_map(Size::Proportional),
        ]
    }

    proptest! {
        #[test]
        fn prop_conservation(
            main in 0u16..300,
            gap in 0u16..4,
            sizes in prop::collection::vec(size_strategy(), 1..10),
        ) {
            let fixed: u32 = sizes.iter().map(|s| match s {
                Size::Fixed(n) => *n as u32,
                Size::Proportional(_) => 0,
            }).sum();
            let gaps = gap as u32 * (sizes.len() as u32 - 1);
            let has_proportional = sizes.iter().any(|s| matches!(s, Size::Proportional(_)));
            prop_assume!(has_proportional && main as u32 >= fixed + gaps);

            let lengths = solve(main, &sizes, gap);
            let total: u32 = lengths.iter().map(|&l| l as u32).sum();
            prop_assert_eq!(total + gaps, main as u32);

            // Every non-last proportional slot gets exactly its floor share
            let remaining = main as u32 - fixed - gaps;
            let weights: u32 = sizes.iter().filter_map(Size::weight).sum();
            let last = sizes.iter().rposition(|s| s.weight().is_some()).unwrap();
            for (i, size) in sizes.iter().enumerate() {
                if let Some(w) = size.weight() {
                    if i != last {
                        prop_assert_eq!(lengths[i] as u32, remaining * w / weights);
                    }
                }
            }
        }

        #[test]
        fn prop_rects_within_parent(
            x in 0u16..50,
            y in 0u16..50,
            width in 0u16..120,
            height in 0u16..40,
            gap in 0u16..5,
            sizes in prop::collection::vec(size_strategy(), 0..10),
            vertical in any::<bool>(),
        ) {
            let area = Rect::new(x, y, width, height);
            let slots: Vec<SlotSpec> = sizes.into_iter().map(SlotSpec::new).collect();
            let orientation = if vertical { Orientation::Vertical } else { Orientation::Horizontal };
            let rects = split(area, &slots, orientation, gap, Alignment::Stretch);
            prop_assert_eq!(rects.len(), slots.len());
            for rect in rects {
                prop_assert!(rect.x >= area.x && rect.right() <= area.right());
                prop_assert!(rect.y >= area.y && rect.bottom() <= area.bottom());
            }
        }

        #[test]
        fn prop_rects_within_parent_near_limit(
            x in (u16::MAX - 300)..=u16::MAX,
            width in 0u16..600,
            gap in 0u16..5,
            sizes in prop::collection::vec(size_strategy(), 0..10),
            alignment in prop_oneof![
                Just(Alignment::Stretch),
                Just(Alignment::Start),
                Just(Alignment::Center),
                Just(Alignment::End),
            ],
        ) {
            let area = Rect::new(x, u16::MAX - 2, width, 40);
            let slots: Vec<SlotSpec> = sizes.into_iter().map(|s| SlotSpec::new(s).with_measured(3, 7)).collect();
            for orientation in [Orientation::Horizontal, Orientation::Vertical] {
                for rect in split(area, &slots, orientation, gap, alignment) {
                    prop_assert!(rect.x >= area.x && rect.right() <= area.right());
                    prop_assert!(rect.y >= area.y && rect.bottom() <= area.bottom());
                }
            }
        }
    }
}
