//! Word trigram text generation library.
//!
//! This crate learns a third-order word chain from plain text and walks it
//! randomly to synthesize new sentences:
//! - A fixed-depth weighted tree (root, then three word levels)
//! - Concurrent learning and sampling behind a single reader/writer guard
//! - Sentence assembly and normalization
//!
//! Only the store, its configuration and the normalizer are public. The tree
//! itself is kept internal so its depth contract cannot be misused.

/// Trigram tree, sampling and the shared store.
pub mod model;

/// Errors returned by the store.
pub mod error;

/// Text utilities (lazy word tokenizer, sentence normalization).
pub mod text;

pub use error::TrigramError;
pub use model::sentence_length::SentenceLength;
pub use model::store::{Store, StoreStats};
pub use text::normalize;
