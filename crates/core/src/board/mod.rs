//! Board state management
//!
//! [`Board`] holds the columns and cards and applies mutations
//! synchronously. [`BoardStore`] owns a board for a running application:
//! it serializes access, persists after every change and notifies
//! subscribers.

pub mod codec;
pub mod ids;
mod model;
mod store;

pub use codec::default_board;
pub use model::*;
pub use store::*;
