//! Comment grouping by anchor position.

pub mod index;

pub use index::build;
