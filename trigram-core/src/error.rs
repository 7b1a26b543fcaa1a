use thiserror::Error;

/// Errors surfaced by [`Store`](crate::Store) operations.
///
/// Contract violations (extending a leaf node, normalizing empty text) are
/// not represented here: they panic.
#[derive(Error, Debug)]
pub enum TrigramError {
	/// The store was never initialized with a root.
	#[error("trigram store not found")]
	StoreNotFound,

	/// The tree is missing a level needed for a full trigram draw.
	#[error("text is too short to extract trigram")]
	TooShort,

	/// Reading the learning stream failed.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// A writer panicked while holding the tree guard.
	#[error("trigram store lock poisoned")]
	LockPoisoned,

	/// Rejected sentence length configuration.
	#[error("invalid sentence length: {0}")]
	InvalidLength(String),
}
