//! Error types.

use std::io;

use thiserror::Error;

use crate::widget::WidgetId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("surface initialization failed: {0}")]
    SurfaceInit(#[source] io::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("widget {0:?} is not in the tree")]
    UnknownWidget(WidgetId),

    #[error("widget {0:?} cannot hold children")]
    NotAContainer(WidgetId),

    #[error("pane {0:?} already holds a child")]
    PaneOccupied(WidgetId),

    #[error("layout {0:?} only accepts panes")]
    NotAPane(WidgetId),

    #[error("layout {0:?} is full ({1} slots)")]
    LayoutFull(WidgetId, usize),

    #[error("the tree has no root")]
    NoRoot,

    #[error("failed to spawn {0} thread: {1}")]
    ThreadSpawn(&'static str, #[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
