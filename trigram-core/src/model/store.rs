use std::io::{BufReader, Read};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace, warn};
use rand::Rng;
use serde::Serialize;

use super::node::{MAX_DEPTH, Node};
use super::sentence_length::SentenceLength;
use crate::error::TrigramError;
use crate::text::{Words, normalize};

/// Thread-safe trigram store.
///
/// Owns the root of the trigram tree behind a single reader/writer lock.
/// Learning takes the write lock once per inserted trigram and generation
/// takes the read lock once per sampled trigram, so concurrent `learn` and
/// `generate` calls interleave freely: a sentence may mix trigrams drawn
/// from different states of the tree.
///
/// Share it between threads with a reference or an `Arc`.
#[derive(Debug)]
pub struct Store {
	root: Option<RwLock<Node>>,
	sentence_length: SentenceLength,
}

/// Snapshot of the tree size.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
	/// Distinct word nodes at depth 1, 2 and 3. The last entry is the number
	/// of distinct trigrams.
	pub nodes: [usize; MAX_DEPTH as usize],
	/// Total number of trigrams learned, repetitions included.
	pub trigrams: u64,
}

impl Store {
	/// Creates an empty store using the default sentence length.
	pub fn new() -> Self {
		Self::with_sentence_length(SentenceLength::default())
	}

	/// Creates an empty store generating sentences of the given length.
	pub fn with_sentence_length(sentence_length: SentenceLength) -> Self {
		Self {
			root: Some(RwLock::new(Node::root())),
			sentence_length,
		}
	}

	/// Creates a store without a tree.
	///
	/// Every operation on it fails with [`TrigramError::StoreNotFound`].
	pub fn uninitialized() -> Self {
		Self {
			root: None,
			sentence_length: SentenceLength::default(),
		}
	}

	pub fn sentence_length(&self) -> &SentenceLength {
		&self.sentence_length
	}

	/// Learns every trigram of a text stream.
	///
	/// The stream is split on whitespace and read lazily. A window of three
	/// consecutive words slides over it and each position is inserted, so a
	/// text of `n >= 3` words yields `n - 2` overlapping trigrams.
	///
	/// Returns the number of trigrams inserted.
	///
	/// # Errors
	/// - [`TrigramError::Io`] if reading the stream fails. Trigrams read
	///   before the failure stay learned.
	/// - [`TrigramError::StoreNotFound`] on an uninitialized store.
	pub fn learn<R: Read>(&self, reader: R) -> Result<usize, TrigramError> {
		let root = self.root()?;

		let mut window: [String; 3] = Default::default();
		let mut words = 0usize;
		let mut inserted = 0usize;

		for word in Words::new(BufReader::new(reader)) {
			window.rotate_left(1);
			window[2] = word?;
			words += 1;

			if words < 3 {
				continue;
			}

			let [first, middle, last] = &window;
			Self::write(root)?.insert_trigram(first, middle, last);
			trace!("learned trigram ({first}, {middle}, {last})");
			inserted += 1;
		}

		debug!("learned {inserted} trigrams from {words} words");
		Ok(inserted)
	}

	/// Generates a sentence using the thread-local random generator.
	///
	/// See [`Store::generate_with`].
	pub fn generate(&self) -> Result<String, TrigramError> {
		self.generate_with(&mut rand::rng())
	}

	/// Generates a sentence from random walks over the tree.
	///
	/// Draws a length from the store's [`SentenceLength`], samples that many
	/// trigrams, joins them with spaces and normalizes the result.
	///
	/// # Errors
	/// - [`TrigramError::TooShort`] if no full trigram can be drawn yet.
	/// - [`TrigramError::StoreNotFound`] on an uninitialized store.
	pub fn generate_with<R: Rng>(&self, rng: &mut R) -> Result<String, TrigramError> {
		let root = self.root()?;

		let length = self.sentence_length.sample(rng);
		let mut trigrams = Vec::with_capacity(length);
		for _ in 0..length {
			trigrams.push(Self::trigram(root, rng)?);
		}

		Ok(normalize(&trigrams.join(" ")))
	}

	/// Returns the current size of the tree.
	pub fn stats(&self) -> Result<StoreStats, TrigramError> {
		let root = Self::read(self.root()?)?;

		let mut nodes = [0; MAX_DEPTH as usize];
		root.count_levels(&mut nodes);
		let trigrams = root.children().map(Node::weight).sum();

		Ok(StoreStats { nodes, trigrams })
	}

	/// Samples one trigram, holding the read lock only for this draw.
	fn trigram<R: Rng>(root: &RwLock<Node>, rng: &mut R) -> Result<String, TrigramError> {
		let root = Self::read(root)?;
		let words = root.sample_trigram(rng).ok_or(TrigramError::TooShort)?;
		Ok(words.join(" "))
	}

	fn root(&self) -> Result<&RwLock<Node>, TrigramError> {
		self.root.as_ref().ok_or(TrigramError::StoreNotFound)
	}

	fn read(root: &RwLock<Node>) -> Result<RwLockReadGuard<'_, Node>, TrigramError> {
		root.read().map_err(|_| {
			warn!("trigram store lock poisoned");
			TrigramError::LockPoisoned
		})
	}

	fn write(root: &RwLock<Node>) -> Result<RwLockWriteGuard<'_, Node>, TrigramError> {
		root.write().map_err(|_| {
			warn!("trigram store lock poisoned");
			TrigramError::LockPoisoned
		})
	}
}

impl Default for Store {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn uninitialized_store_is_not_found() {
		let store = Store::uninitialized();

		assert!(matches!(store.generate(), Err(TrigramError::StoreNotFound)));
		assert!(matches!(store.learn("a b c".as_bytes()), Err(TrigramError::StoreNotFound)));
		assert!(matches!(store.stats(), Err(TrigramError::StoreNotFound)));
	}

	#[test]
	fn empty_store_is_too_short() {
		let store = Store::new();

		assert!(matches!(store.generate(), Err(TrigramError::TooShort)));
		assert_eq!(store.stats().unwrap(), StoreStats::default());
	}

	#[test]
	fn learn_slides_the_window() {
		let store = Store::new();

		assert_eq!(store.learn("a b c a b c".as_bytes()).unwrap(), 4);
		assert_eq!(
			store.stats().unwrap(),
			StoreStats {
				nodes: [3, 3, 3],
				trigrams: 4
			}
		);
	}

	#[test]
	fn repeated_trigram_only_adds_weight() {
		let store = Store::new();
		store.learn("to be or".as_bytes()).unwrap();
		let before = store.stats().unwrap();

		store.learn("to be or".as_bytes()).unwrap();
		let after = store.stats().unwrap();

		assert_eq!(before.nodes, after.nodes);
		assert_eq!(before.trigrams, 1);
		assert_eq!(after.trigrams, 2);
	}

	#[test]
	fn generate_with_single_trigram() {
		let mut rng = StdRng::seed_from_u64(5);
		let store = Store::with_sentence_length(SentenceLength::new(2.0, 0.0).unwrap());
		store.learn("to be or".as_bytes()).unwrap();

		assert_eq!(store.generate_with(&mut rng).unwrap(), "To be or to be or.");
	}

	#[test]
	fn generate_is_reproducible_with_seed() {
		let store = Store::new();
		store
			.learn("the cat sat on the mat and the dog sat on the cat".as_bytes())
			.unwrap();

		let a = store.generate_with(&mut StdRng::seed_from_u64(9)).unwrap();
		let b = store.generate_with(&mut StdRng::seed_from_u64(9)).unwrap();
		assert_eq!(a, b);
	}
}
