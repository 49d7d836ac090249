//! Id generation for columns and cards

use super::model::Board;

pub const COLUMN_PREFIX: &str = "column";
pub const CARD_PREFIX: &str = "card";

/// Generate an id that is not yet used by any column or card on `board`.
///
/// Ids look like `card-1718000000000-3f2a9c1d`. A fresh candidate is drawn
/// until it misses the board's shared id namespace.
pub fn generate(prefix: &str, board: &Board) -> String {
    loop {
        let id = format!(
            "{}-{}-{}",
            prefix,
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().to_string().split('-').next().unwrap_or("0000")
        );
        if !board.contains_id(&id) {
            return id;
        }
        tracing::debug!("Generated id {} already in use, retrying", id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::default_board;

    #[test]
    fn test_generate_has_prefix() {
        let board = default_board();
        let id = generate(CARD_PREFIX, &board);
        assert!(id.starts_with("card-"));
        assert_eq!(id.split('-').count(), 3);
        assert!(!board.contains_id(&id));
    }

    #[test]
    fn test_generate_distinct() {
        let board = default_board();
        let a = generate(COLUMN_PREFIX, &board);
        let b = generate(COLUMN_PREFIX, &board);
        assert_ne!(a, b);
    }
}
