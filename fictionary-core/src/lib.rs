//! Invented-word generation library.
//!
//! This crate builds English-looking words that do not exist, by walking a
//! second-order character Markov chain trained on real word lists:
//! - Character-level chain with deterministic weighted sampling
//! - Bounded retry generation with length and "not a real word" rules
//! - Versioned JSON model files, plus binary snapshots for fast reloads
//! - Parallel word-list ingestion
//! - Lazily loaded named dictionaries
//!
//! Typical use goes through a [`ModelCollection`]:
//!
//! ```no_run
//! use fictionary_core::{DataSource, Dictionary, ModelCollection};
//!
//! let mut models = ModelCollection::new(DataSource::from_env());
//! let words = fictionary_core::get_random_words(&mut models, 3, 4, Some(8), Dictionary::British)?;
//! # Ok::<(), fictionary_core::FictionaryError>(())
//! ```

/// Error taxonomy shared by every module.
pub mod error;

/// Word model: chain, sampling, persistence, ingestion, collection.
pub mod model;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use error::{FictionaryError, Result, SUPPORTED_FILE_VER};
pub use model::collection::{DataSource, ModelCollection};
pub use model::markov_chain::{MAX_ATTEMPTS, MarkovChain, SequenceFilter};
pub use model::request::{DEFAULT_MIN_LENGTH, DEFAULT_NUM_WORDS, Dictionary, LengthBounds};
pub use model::word_model::WordModel;

/// Generates one invented word from `dictionary`.
///
/// Fails with `InvalidLengthRange` before loading anything when
/// `min_length > max_length`.
pub fn get_random_word(
	models: &mut ModelCollection,
	min_length: usize,
	max_length: Option<usize>,
	dictionary: Dictionary,
) -> Result<String> {
	models.random_word(&mut rand::rng(), min_length, max_length, dictionary)
}

/// Generates `count` invented words from `dictionary`.
pub fn get_random_words(
	models: &mut ModelCollection,
	count: usize,
	min_length: usize,
	max_length: Option<usize>,
	dictionary: Dictionary,
) -> Result<Vec<String>> {
	models.random_words(&mut rand::rng(), count, min_length, max_length, dictionary)
}
