//! Report module - terminal summaries and file exports

pub mod export;
pub mod summary;

pub use export::*;
pub use summary::*;
