use std::collections::HashMap;

use rand::Rng;

/// Depth of the deepest word level. The tree always has exactly this many
/// word levels below its virtual root.
pub(crate) const MAX_DEPTH: u8 = 3;

/// Extra slot added to the cumulative weight of a draw.
const SMOOTHING: u64 = 1;

/// A node of the trigram tree.
///
/// The root sits at depth 0 and carries no word. Each node at depth `d`
/// represents a word observed at position `d` of a trigram after the words
/// of its parent path, and `weight` counts how many times that happened.
///
/// ## Invariants
/// - `depth` is exactly the parent's depth + 1, never more than [`MAX_DEPTH`]
/// - Children are keyed by their own word, so `(parent, word)` is unique
/// - Every non-root node has a weight >= 1
#[derive(Debug, Default)]
pub(crate) struct Node {
	word: String,
	weight: u64,
	depth: u8,
	children: HashMap<String, Node>,
}

impl Node {
	/// Creates an empty virtual root.
	pub fn root() -> Self {
		Self::default()
	}

	pub fn word(&self) -> &str {
		&self.word
	}

	pub fn weight(&self) -> u64 {
		self.weight
	}

	pub fn depth(&self) -> u8 {
		self.depth
	}

	pub fn children(&self) -> impl Iterator<Item = &Node> {
		self.children.values()
	}

	/// Records an occurrence of `word` right below this node.
	///
	/// - If the child already exists, its weight is increased by one.
	/// - Otherwise a child of weight 1 is created one level deeper.
	///
	/// Returns the child so that chains can be built level by level.
	///
	/// # Panics
	/// Panics if this node is already at [`MAX_DEPTH`]: a trigram never has a
	/// fourth word.
	pub fn insert(&mut self, word: &str) -> &mut Node {
		assert!(
			self.depth < MAX_DEPTH,
			"the depth of a trigram is exactly {MAX_DEPTH}, cannot extend a node at depth {}",
			self.depth
		);

		let depth = self.depth + 1;
		self.children
			.entry(word.to_owned())
			.and_modify(|child| child.weight += 1)
			.or_insert_with(|| Node {
				word: word.to_owned(),
				weight: 1,
				depth,
				children: HashMap::new(),
			})
	}

	/// Inserts the `first -> middle -> last` path below the root.
	///
	/// # Panics
	/// Panics if called on anything but a root node.
	pub fn insert_trigram(&mut self, first: &str, middle: &str, last: &str) {
		assert_eq!(self.depth, 0, "trigrams are inserted from the root");
		self.insert(first).insert(middle).insert(last);
	}

	/// Picks a child at random, weighted by occurrence.
	///
	/// Draws `r` in `[0, total)` where `total` is the sum of the children
	/// weights plus a smoothing slot, then walks the children subtracting
	/// each one's weight until `r` is exhausted.
	///
	/// Returns `None` if the node has no children.
	pub fn select_child<R: Rng>(&self, rng: &mut R) -> Option<&Node> {
		if self.children.is_empty() {
			return None;
		}

		let total: u64 = self.children.values().map(|child| child.weight).sum::<u64>() + SMOOTHING;
		let mut r = rng.random_range(0..total);

		let mut fallback = None;
		for child in self.children.values() {
			if r <= child.weight {
				return Some(child);
			}
			r -= child.weight;
			fallback = Some(child);
		}

		// r < sum + 1, so the walk always ends on a child
		fallback
	}

	/// Walks three levels down from this node, returning the sampled words.
	///
	/// Returns `None` as soon as a level has no children.
	pub fn sample_trigram<R: Rng>(&self, rng: &mut R) -> Option<[&str; 3]> {
		let first = self.select_child(rng)?;
		let middle = first.select_child(rng)?;
		let last = middle.select_child(rng)?;
		Some([first.word(), middle.word(), last.word()])
	}

	/// Adds the number of nodes found at each word level of this subtree.
	pub fn count_levels(&self, counts: &mut [usize; MAX_DEPTH as usize]) {
		for child in self.children.values() {
			counts[child.depth() as usize - 1] += 1;
			child.count_levels(counts);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn insert_creates_then_reinforces() {
		let mut root = Node::root();

		let child = root.insert("var");
		assert_eq!(child.word(), "var");
		assert_eq!(child.weight(), 1);
		assert_eq!(child.depth(), 1);

		let child = root.insert("var");
		assert_eq!(child.weight(), 2);
		assert_eq!(root.children().count(), 1);
	}

	#[test]
	fn insert_trigram_builds_path() {
		let mut root = Node::root();
		root.insert_trigram("var", "foo", "=");
		root.insert_trigram("var", "foo", "=");
		root.insert_trigram("var", "bar", "=");

		let first = root.children().next().unwrap();
		assert_eq!(first.weight(), 3);
		assert_eq!(first.children().count(), 2);

		for middle in first.children() {
			assert_eq!(middle.depth(), 2);
			let last = middle.children().next().unwrap();
			assert_eq!(last.depth(), 3);
			assert_eq!(last.word(), "=");
		}

		let mut counts = [0; 3];
		root.count_levels(&mut counts);
		assert_eq!(counts, [1, 2, 2]);
	}

	#[test]
	#[should_panic(expected = "the depth of a trigram is exactly 3")]
	fn insert_past_leaf_panics() {
		let mut root = Node::root();
		let leaf = root.insert("var").insert("foo").insert("=");

		leaf.insert("bar");
	}

	#[test]
	fn select_child_on_leaf_is_none() {
		let mut rng = StdRng::seed_from_u64(7);
		assert!(Node::root().select_child(&mut rng).is_none());
	}

	#[test]
	fn select_child_single_child() {
		let mut rng = StdRng::seed_from_u64(7);
		let mut root = Node::root();
		root.insert("only");

		for _ in 0..100 {
			assert_eq!(root.select_child(&mut rng).unwrap().word(), "only");
		}
	}

	#[test]
	fn select_child_follows_weights() {
		let mut rng = StdRng::seed_from_u64(42);
		let mut root = Node::root();
		for _ in 0..99 {
			root.insert("common");
		}
		root.insert("rare");

		let draws = 2000;
		let common = (0..draws)
			.filter(|_| root.select_child(&mut rng).unwrap().word() == "common")
			.count();

		assert!(common > draws * 9 / 10, "common picked {common} times out of {draws}");
		assert!(common < draws, "rare was never picked");
	}

	#[test]
	fn sample_trigram_needs_three_levels() {
		let mut rng = StdRng::seed_from_u64(1);
		let mut root = Node::root();
		root.insert("to").insert("be");
		assert!(root.sample_trigram(&mut rng).is_none());

		root.insert_trigram("to", "be", "or");
		assert_eq!(root.sample_trigram(&mut rng), Some(["to", "be", "or"]));
	}
}
