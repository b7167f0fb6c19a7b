//! Browse engine crate.
//!
//! Pure filter/sort/aggregation over the in-memory drink list, the
//! similar-drinks heuristic, and the mutable browse session state.

pub mod engine;
pub mod similar;
pub mod state;

pub use engine::FilterState;
pub use similar::{similar_drinks, SimilarDrink, SimilarReason};
pub use state::{user_message, BrowseState};
