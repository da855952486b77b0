use std::fmt;
use std::str::FromStr;

use crate::error::{FictionaryError, Result};

/// Shortest word generated when the caller does not say otherwise.
pub const DEFAULT_MIN_LENGTH: usize = 4;

/// Number of words generated when the caller does not say otherwise.
pub const DEFAULT_NUM_WORDS: usize = 1;

/// Accepted word lengths, in characters.
///
/// # Invariants
/// - `min <= max` whenever `max` is set
/// - `max == None` means no upper limit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthBounds {
	min: usize,
	max: Option<usize>,
}

impl LengthBounds {
	/// Creates bounds from a minimum and an optional maximum.
	///
	/// # Errors
	/// Returns `InvalidLengthRange` if `min > max`.
	pub fn new(min: usize, max: Option<usize>) -> Result<Self> {
		match max {
			Some(max) if min > max => Err(FictionaryError::InvalidLengthRange { min, max }),
			_ => Ok(Self { min, max }),
		}
	}

	pub fn min(&self) -> usize {
		self.min
	}

	pub fn max(&self) -> Option<usize> {
		self.max
	}

	/// Returns `true` if a word of `length` characters is acceptable.
	pub fn contains(&self, length: usize) -> bool {
		length >= self.min && self.max.is_none_or(|max| length <= max)
	}
}

impl Default for LengthBounds {
	fn default() -> Self {
		Self { min: DEFAULT_MIN_LENGTH, max: None }
	}
}

/// Spelling rules a pretrained model follows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dictionary {
	#[default]
	British,
	American,
	All,
}

impl Dictionary {
	pub const ALL: [Dictionary; 3] = [Dictionary::All, Dictionary::British, Dictionary::American];

	/// Lowercase name, also the stem of the packaged model file.
	pub fn name(self) -> &'static str {
		match self {
			Dictionary::British => "british",
			Dictionary::American => "american",
			Dictionary::All => "all",
		}
	}
}

impl fmt::Display for Dictionary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Dictionary {
	type Err = FictionaryError;

	fn from_str(s: &str) -> Result<Self> {
		Dictionary::ALL
			.into_iter()
			.find(|d| d.name().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| FictionaryError::UnknownDictionary(s.to_owned()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bounds_reject_inverted_range() {
		assert!(matches!(
			LengthBounds::new(12, Some(10)),
			Err(FictionaryError::InvalidLengthRange { min: 12, max: 10 })
		));
		assert!(LengthBounds::new(5, Some(5)).is_ok());
		assert!(LengthBounds::new(50, None).is_ok());
	}

	#[test]
	fn bounds_contain_lengths() {
		let bounds = LengthBounds::new(3, Some(5)).unwrap();
		assert!(!bounds.contains(2));
		assert!(bounds.contains(3));
		assert!(bounds.contains(5));
		assert!(!bounds.contains(6));

		let open = LengthBounds::default();
		assert_eq!(open.min(), DEFAULT_MIN_LENGTH);
		assert!(open.contains(10_000));
		assert!(!open.contains(3));
	}

	#[test]
	fn dictionary_names_round_trip() {
		for dictionary in Dictionary::ALL {
			assert_eq!(dictionary.name().parse::<Dictionary>().unwrap(), dictionary);
		}
		assert_eq!("British".parse::<Dictionary>().unwrap(), Dictionary::British);
		assert_eq!(Dictionary::default(), Dictionary::British);
		assert!(matches!(
			"klingon".parse::<Dictionary>(),
			Err(FictionaryError::UnknownDictionary(name)) if name == "klingon"
		));
	}
}
