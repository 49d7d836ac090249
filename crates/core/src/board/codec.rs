//! Board serialization
//!
//! The board is stored as a JSON array of column records, each carrying its
//! cards in order. There is no version tag.

use crate::Result;

use super::model::{Board, Card, Column};

/// Encode a board as JSON
pub fn encode(board: &Board) -> Result<String> {
    Ok(serde_json::to_string(board)?)
}

/// Decode a board, rejecting payloads that break the id invariants
pub fn decode(content: &str) -> Result<Board> {
    let columns: Vec<Column> = serde_json::from_str(content)?;
    Board::from_columns(columns)
}

/// The board a fresh installation starts with
pub fn default_board() -> Board {
    let column = |id: &str, cards: [&str; 2]| {
        Column::new(id, id).with_cards(cards.iter().map(|c| Card::new(*c, *c)).collect())
    };
    Board::from_columns(vec![
        column("Column1", ["Card1", "Card2"]),
        column("Column2", ["Card3", "Card4"]),
    ])
    .unwrap_or_default()
}
