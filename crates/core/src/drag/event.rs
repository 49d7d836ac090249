//! Drag gesture events and outcomes

use serde::{Deserialize, Serialize};

/// Pointer movement since the gesture started
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub x: f64,
    pub y: f64,
}

impl Delta {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether the pointer has moved downward
    pub fn is_downward(&self) -> bool {
        self.y > 0.0
    }
}

/// A drag-over or drag-end event as delivered by the UI.
///
/// `over_id` is whatever droppable element sits under the pointer: a card
/// id, a column id (empty column area), or nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragMove {
    pub active_id: String,
    #[serde(default)]
    pub over_id: Option<String>,
    #[serde(default)]
    pub delta: Delta,
}

impl DragMove {
    pub fn new(active_id: impl Into<String>, over_id: Option<&str>) -> Self {
        Self {
            active_id: active_id.into(),
            over_id: over_id.map(str::to_string),
            delta: Delta::default(),
        }
    }

    pub fn with_delta(mut self, delta: Delta) -> Self {
        self.delta = delta;
        self
    }
}

/// What a drag event did to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Event did not apply (no session, unknown ids, same-column hover)
    Ignored,
    /// A session began for a card. `restored` is set when an unfinished
    /// gesture had to be undone first.
    Started {
        card_id: String,
        column_id: String,
        restored: bool,
    },
    /// The card was optimistically moved into another column
    Previewed {
        card_id: String,
        column_id: String,
        index: usize,
    },
    /// The gesture finished on a resolvable target
    Dropped {
        card_id: String,
        column_id: String,
        index: usize,
        moved: bool,
    },
    /// The gesture was abandoned and the pre-drag board restored
    Cancelled { restored: bool },
}

impl DragOutcome {
    /// Whether the board differs from before the event
    pub fn board_changed(&self) -> bool {
        match self {
            Self::Previewed { .. } => true,
            Self::Dropped { moved, .. } => *moved,
            Self::Started { restored, .. } | Self::Cancelled { restored } => *restored,
            Self::Ignored => false,
        }
    }
}
