//! Core library for the Kanban board
//!
//! This crate contains the board logic, including:
//! - Board model and mutations (columns, cards, moves)
//! - Drag-and-drop session handling
//! - Key-value persistence of the serialized board

pub mod board;
pub mod drag;
pub mod error;
pub mod storage;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
