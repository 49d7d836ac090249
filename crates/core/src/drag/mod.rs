//! Drag-and-drop reordering
//!
//! A [`DragSession`] turns drag-start/over/end/cancel events into card moves
//! on a [`crate::board::Board`] that the caller owns.

mod event;
mod session;
mod target;

pub use event::*;
pub use session::{DragPhase, DragSession};
pub use target::DropTarget;
