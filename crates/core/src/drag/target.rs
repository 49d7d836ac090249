//! Drop target resolution
//!
//! Both the live preview during a drag and the final drop go through
//! [`DropTarget::resolve`] and then [`Board::move_card`], so the index
//! arithmetic exists in one place.

use crate::board::Board;

use super::event::Delta;

/// Where a dragged card should land
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub column_id: String,
    pub index: usize,
    /// The card currently lives in a different column than the target
    pub crosses_columns: bool,
}

impl DropTarget {
    /// Resolve the landing position of `active_id` while the pointer is over
    /// `over_id`.
    ///
    /// Returns `None` if the active id is not a card or the over id names
    /// nothing on the board.
    ///
    /// Within a column, hovering a card takes that card's index (array move
    /// semantics); hovering the column area moves to the end. Across
    /// columns, hovering a card inserts before it, or after it when it is
    /// the last card and the pointer is moving down; hovering the column
    /// area appends.
    pub fn resolve(board: &Board, active_id: &str, over_id: &str, delta: Delta) -> Option<Self> {
        let (active_column, _) = board.card_position(active_id)?;
        let over_column = board.find_column_index(over_id)?;
        let column = &board.columns()[over_column];
        let over_index = column.position(over_id);

        let index = if active_column == over_column {
            over_index.unwrap_or(column.len())
        } else {
            match over_index {
                Some(i) if i + 1 == column.len() && delta.is_downward() => i + 1,
                Some(i) => i,
                None => column.len(),
            }
        };

        Some(Self {
            column_id: column.id.clone(),
            index,
            crosses_columns: active_column != over_column,
        })
    }

    /// Move `card_id` here. Returns `true` if the board changed.
    pub fn apply(&self, board: &mut Board, card_id: &str) -> bool {
        board.move_card(card_id, &self.column_id, self.index)
    }
}
