//! Board model definitions
//!
//! A board is an ordered list of columns, each an ordered list of cards.
//! Column ids and card ids share one namespace, so any id on the board
//! identifies exactly one column or exactly one card.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ids;
use crate::error::Error;
use crate::Result;

/// A card on the board
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
}

impl Card {
    /// Create a new card
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A column and the cards it owns, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub cards: Vec<Card>,
}

impl Column {
    /// Create a new empty column
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            cards: Vec::new(),
        }
    }

    /// Set the initial cards
    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }

    /// Index of a card within this column
    pub fn position(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// The complete board state.
///
/// Serializes as a bare array of columns. Deserialization validates that
/// every id on the board is unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Column>", into = "Vec<Column>")]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from columns, rejecting duplicate ids
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let board = Self { columns };
        board.validate()?;
        Ok(board)
    }

    /// Check the id invariants: column ids and card ids are unique across
    /// the whole board, and no card shares an id with a column.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.id.as_str()) {
                return Err(Error::InvalidBoard(format!(
                    "duplicate id: {}",
                    column.id
                )));
            }
        }
        for card in self.columns.iter().flat_map(|c| &c.cards) {
            if !seen.insert(card.id.as_str()) {
                return Err(Error::InvalidBoard(format!("duplicate id: {}", card.id)));
            }
        }
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by its own id
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    /// Index of the column identified by `id`, where `id` is either a
    /// column id or the id of a card the column owns.
    pub fn find_column_index(&self, id: &str) -> Option<usize> {
        if let Some(index) = self.columns.iter().position(|c| c.id == id) {
            return Some(index);
        }
        self.card_position(id).map(|(column_index, _)| column_index)
    }

    /// Resolve a column id or card id to the owning column.
    ///
    /// `None` is not an error: callers abort whatever they were doing.
    pub fn find_column(&self, id: &str) -> Option<&Column> {
        self.find_column_index(id).map(|index| &self.columns[index])
    }

    /// Locate a card as `(column_index, card_index)`
    pub fn card_position(&self, card_id: &str) -> Option<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(ci, column)| column.position(card_id).map(|i| (ci, i)))
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.card_position(card_id)
            .map(|(ci, i)| &self.columns[ci].cards[i])
    }

    /// Whether `id` names any column or card on the board
    pub fn contains_id(&self, id: &str) -> bool {
        self.find_column_index(id).is_some()
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Append a new empty column. Blank titles are rejected.
    pub fn add_column(&mut self, title: impl Into<String>) -> Option<&Column> {
        let title = title.into();
        if title.trim().is_empty() {
            return None;
        }
        let id = ids::generate(ids::COLUMN_PREFIX, self);
        self.columns.push(Column::new(id, title));
        self.columns.last()
    }

    /// Remove a column together with all of its cards
    pub fn delete_column(&mut self, column_id: &str) -> Option<Column> {
        let index = self.columns.iter().position(|c| c.id == column_id)?;
        Some(self.columns.remove(index))
    }

    /// Append a new card to a column. Blank titles and unknown columns
    /// are rejected.
    pub fn add_card(&mut self, column_id: &str, title: impl Into<String>) -> Option<&Card> {
        let title = title.into();
        if title.trim().is_empty() {
            return None;
        }
        let index = self.columns.iter().position(|c| c.id == column_id)?;
        let id = ids::generate(ids::CARD_PREFIX, self);
        let cards = &mut self.columns[index].cards;
        cards.push(Card::new(id, title));
        cards.last()
    }

    /// Remove a card from the given column
    pub fn delete_card(&mut self, column_id: &str, card_id: &str) -> Option<Card> {
        let column = self.columns.iter_mut().find(|c| c.id == column_id)?;
        let index = column.position(card_id)?;
        Some(column.cards.remove(index))
    }

    /// Move a card to `target_index` in the target column.
    ///
    /// The index is clamped to `[0, len]`, where `len` is the target's
    /// length once the card has been taken out of its current column.
    /// Returns `true` when the board changed.
    pub fn move_card(&mut self, card_id: &str, target_column_id: &str, target_index: usize) -> bool {
        let Some(target) = self.columns.iter().position(|c| c.id == target_column_id) else {
            return false;
        };
        let Some((source, source_index)) = self.card_position(card_id) else {
            return false;
        };

        let card = self.columns[source].cards.remove(source_index);
        let cards = &mut self.columns[target].cards;
        let index = target_index.min(cards.len());
        cards.insert(index, card);

        !(source == target && source_index == index)
    }
}

impl TryFrom<Vec<Column>> for Board {
    type Error = Error;

    fn try_from(columns: Vec<Column>) -> Result<Self> {
        Self::from_columns(columns)
    }
}

impl From<Board> for Vec<Column> {
    fn from(board: Board) -> Self {
        board.columns
    }
}
