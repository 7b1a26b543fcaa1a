//! Trigram model.
//!
//! - Weighted fixed-depth tree (`Node`), internal
//! - Sentence length distribution (`SentenceLength`)
//! - Concurrent learning and generation (`Store`)

/// Fixed-depth weighted tree node, chain building and weighted sampling.
///
/// Not exposed: the depth contract is enforced by panicking, which only the
/// store is trusted to respect.
mod node;

/// Normal distribution of sentence lengths, in trigrams.
pub mod sentence_length;

/// Shared trigram store with `learn` / `generate` operations.
pub mod store;
