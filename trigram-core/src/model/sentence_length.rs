use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::TrigramError;

/// Distribution of the number of trigrams assembled into one sentence.
///
/// Lengths are drawn from a normal distribution, rounded to the nearest
/// integer and clamped to `1..=MAX_LENGTH` trigrams, so a generated sentence
/// is never empty nor unbounded.
#[derive(Clone, Copy, Debug)]
pub struct SentenceLength {
	mean: f64,
	std_dev: f64,
	normal: Normal<f64>,
}

impl SentenceLength {
	/// Average sentence length, in trigrams.
	pub const DEFAULT_MEAN: f64 = 28.0;

	/// Default spread around [`Self::DEFAULT_MEAN`].
	pub const DEFAULT_STD_DEV: f64 = 5.0;

	/// Longest sentence ever drawn, in trigrams.
	pub const MAX_LENGTH: usize = 10_000;

	/// Creates a length distribution.
	///
	/// # Errors
	/// Returns an error if a parameter is not finite, if `mean` is outside
	/// `1..=MAX_LENGTH` or if `std_dev` is outside `0..=MAX_LENGTH`.
	pub fn new(mean: f64, std_dev: f64) -> Result<Self, TrigramError> {
		let max = Self::MAX_LENGTH as f64;
		if !(1.0..=max).contains(&mean) {
			return Err(TrigramError::InvalidLength(format!("mean must be between 1 and {max}, got {mean}")));
		}
		if !(0.0..=max).contains(&std_dev) {
			return Err(TrigramError::InvalidLength(format!(
				"standard deviation must be between 0 and {max}, got {std_dev}"
			)));
		}

		let normal = Normal::new(mean, std_dev).map_err(|e| TrigramError::InvalidLength(e.to_string()))?;
		Ok(Self { mean, std_dev, normal })
	}

	pub fn mean(&self) -> f64 {
		self.mean
	}

	pub fn std_dev(&self) -> f64 {
		self.std_dev
	}

	/// Draws a sentence length in `1..=MAX_LENGTH`.
	pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
		let length = self.normal.sample(rng).round();
		length.clamp(1.0, Self::MAX_LENGTH as f64) as usize
	}
}

impl Default for SentenceLength {
	fn default() -> Self {
		Self {
			mean: Self::DEFAULT_MEAN,
			std_dev: Self::DEFAULT_STD_DEV,
			normal: Normal::new(Self::DEFAULT_MEAN, Self::DEFAULT_STD_DEV)
				.expect("default sentence length parameters are valid"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn rejects_invalid_parameters() {
		assert!(SentenceLength::new(0.0, 5.0).is_err());
		assert!(SentenceLength::new(f64::NAN, 5.0).is_err());
		assert!(SentenceLength::new(28.0, -1.0).is_err());
		assert!(SentenceLength::new(28.0, f64::INFINITY).is_err());
		assert!(SentenceLength::new(1.0, 0.0).is_ok());
	}

	#[test]
	fn rejects_huge_lengths() {
		assert!(SentenceLength::new(1e18, 5.0).is_err());
		assert!(SentenceLength::new(28.0, 1e18).is_err());
		assert!(SentenceLength::new(SentenceLength::MAX_LENGTH as f64, 0.0).is_ok());
	}

	#[test]
	fn never_above_max_length() {
		let mut rng = StdRng::seed_from_u64(3);
		let max = SentenceLength::MAX_LENGTH as f64;
		let length = SentenceLength::new(max, max).unwrap();

		assert!((0..500).all(|_| length.sample(&mut rng) <= SentenceLength::MAX_LENGTH));
	}

	#[test]
	fn zero_spread_is_constant() {
		let mut rng = StdRng::seed_from_u64(3);
		let length = SentenceLength::new(4.0, 0.0).unwrap();

		for _ in 0..50 {
			assert_eq!(length.sample(&mut rng), 4);
		}
	}

	#[test]
	fn never_below_one() {
		let mut rng = StdRng::seed_from_u64(3);
		let length = SentenceLength::new(1.0, 10.0).unwrap();

		assert!((0..500).all(|_| length.sample(&mut rng) >= 1));
	}

	#[test]
	fn default_stays_around_mean() {
		let mut rng = StdRng::seed_from_u64(11);
		let length = SentenceLength::default();
		assert_eq!(length.mean(), 28.0);
		assert_eq!(length.std_dev(), 5.0);

		let draws = 1000;
		let total: usize = (0..draws).map(|_| length.sample(&mut rng)).sum();
		let average = total as f64 / draws as f64;
		assert!((26.0..30.0).contains(&average), "average length {average}");
	}
}
