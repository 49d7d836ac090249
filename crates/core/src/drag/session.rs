//! Drag session state machine
//!
//! `Idle -> Dragging -> Idle`. A session starts on a card, previews
//! cross-column moves while the pointer travels, and ends with a drop
//! (commit) or a cancel (restore the board as it was before the drag).

use tracing::debug;

use crate::board::Board;

use super::event::{DragMove, DragOutcome};
use super::target::DropTarget;

/// Observable phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
}

#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        active_id: String,
        /// Board before the gesture began
        origin: Board,
        /// At least one preview moved the card
        previewed: bool,
    },
}

/// Tracks one drag gesture at a time against a board owned by the caller
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        match self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::Dragging { .. } => DragPhase::Dragging,
        }
    }

    /// Id of the card being dragged
    pub fn active_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { active_id, .. } => Some(active_id),
        }
    }

    /// Begin dragging `active_id`. A gesture still in flight is cancelled
    /// first.
    pub fn start(&mut self, board: &mut Board, active_id: &str) -> DragOutcome {
        let restored = self.cancel(board) == DragOutcome::Cancelled { restored: true };
        if restored {
            debug!("Abandoned unfinished drag before starting {}", active_id);
        }

        let column_id = match board.find_column(active_id) {
            Some(column) if column.id != active_id => column.id.clone(),
            // Nothing to start, but the abandoned preview was still undone
            _ if restored => return DragOutcome::Cancelled { restored },
            _ => return DragOutcome::Ignored,
        };

        self.state = DragState::Dragging {
            active_id: active_id.to_string(),
            origin: board.clone(),
            previewed: false,
        };

        DragOutcome::Started {
            card_id: active_id.to_string(),
            column_id,
            restored,
        }
    }

    /// Pointer moved over `event.over_id`. Cross-column hovers move the
    /// card immediately; hovers within its own column wait for the drop.
    pub fn over(&mut self, board: &mut Board, event: &DragMove) -> DragOutcome {
        let DragState::Dragging {
            active_id,
            previewed,
            ..
        } = &mut self.state
        else {
            return DragOutcome::Ignored;
        };
        if *active_id != event.active_id {
            return DragOutcome::Ignored;
        }
        let Some(over_id) = event.over_id.as_deref() else {
            return DragOutcome::Ignored;
        };
        let Some(target) = DropTarget::resolve(board, active_id, over_id, event.delta) else {
            return DragOutcome::Ignored;
        };
        if !target.crosses_columns || !target.apply(board, active_id) {
            return DragOutcome::Ignored;
        }

        *previewed = true;
        debug!(
            "Previewing {} in {} at {}",
            active_id, target.column_id, target.index
        );
        DragOutcome::Previewed {
            card_id: active_id.clone(),
            column_id: target.column_id,
            index: final_index(board, active_id),
        }
    }

    /// Release over `event.over_id`. An unresolvable target cancels the
    /// gesture.
    pub fn end(&mut self, board: &mut Board, event: &DragMove) -> DragOutcome {
        if self.active_id() != Some(event.active_id.as_str()) {
            return DragOutcome::Ignored;
        }

        let target = event
            .over_id
            .as_deref()
            .and_then(|over_id| DropTarget::resolve(board, &event.active_id, over_id, event.delta));
        let Some(target) = target else {
            return self.cancel(board);
        };

        self.state = DragState::Idle;
        let moved = target.apply(board, &event.active_id);
        DragOutcome::Dropped {
            card_id: event.active_id.clone(),
            column_id: target.column_id,
            index: final_index(board, &event.active_id),
            moved,
        }
    }

    /// Abort the gesture and put every previewed card back
    pub fn cancel(&mut self, board: &mut Board) -> DragOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Idle => DragOutcome::Ignored,
            DragState::Dragging {
                origin, previewed, ..
            } => {
                if previewed {
                    *board = origin;
                }
                DragOutcome::Cancelled {
                    restored: previewed,
                }
            }
        }
    }

    /// Forget the gesture without touching the board. Used when the board
    /// is edited by something other than the drag itself, which makes the
    /// saved origin stale.
    pub fn abandon(&mut self) -> bool {
        let was_dragging = self.phase() == DragPhase::Dragging;
        self.state = DragState::Idle;
        was_dragging
    }
}

fn final_index(board: &Board, card_id: &str) -> usize {
    board.card_position(card_id).map(|(_, i)| i).unwrap_or_default()
}
