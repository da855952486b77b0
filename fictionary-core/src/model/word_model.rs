use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::markov_chain::{EncodedChain, MarkovChain, SequenceFilter};
use super::request::LengthBounds;
use crate::error::{FictionaryError, Result, SUPPORTED_FILE_VER};

/// Persisted form of a model: `{ "ver": 1, "markov": { "a,b": { "c": 3 } } }`.
#[derive(Serialize, Deserialize, Debug)]
struct ModelFile {
	ver: u32,
	markov: EncodedChain,
}

impl ModelFile {
	fn into_chain(self) -> Result<MarkovChain> {
		if self.ver != SUPPORTED_FILE_VER {
			return Err(FictionaryError::FileVersion {
				found: self.ver,
				supported: SUPPORTED_FILE_VER,
			});
		}
		MarkovChain::decode(&self.markov)
	}
}

/// Rejects candidates that are already in the real-word set.
struct NotRealWord<'a>(&'a HashSet<String>);

impl SequenceFilter for NotRealWord<'_> {
	fn accepts(&self, candidate: &str) -> bool {
		!self.0.contains(candidate)
	}
}

/// A trained word generator.
///
/// Pairs the statistical structure (`chain`) with the set of known real
/// words, which only serves to stop the generator from handing back a
/// training word verbatim.
///
/// The real-word set is not part of the persisted model. After `read` or
/// `read_snapshot` it is empty until `attach_words` supplies one; until
/// then every generated word counts as invented.
#[derive(Clone, Debug, Default)]
pub struct WordModel {
	chain: MarkovChain,
	words: Arc<HashSet<String>>,
}

impl WordModel {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a model around an existing chain and word set.
	pub fn from_parts(chain: MarkovChain, words: Arc<HashSet<String>>) -> Self {
		Self { chain, words }
	}

	/// Trains the model on `word` and records it as a real word.
	pub fn feed(&mut self, word: &str) {
		Arc::make_mut(&mut self.words).insert(word.to_owned());
		self.chain.feed(word.chars());
	}

	/// Exact membership test against the real-word set.
	pub fn is_real_word(&self, word: &str) -> bool {
		self.words.contains(word)
	}

	/// Number of known real words.
	pub fn word_count(&self) -> usize {
		self.words.len()
	}

	pub fn words(&self) -> &Arc<HashSet<String>> {
		&self.words
	}

	/// Replaces the real-word set, typically after deserializing.
	pub fn attach_words(&mut self, words: Arc<HashSet<String>>) {
		self.words = words;
	}

	pub fn chain(&self) -> &MarkovChain {
		&self.chain
	}

	/// Generates a word that fits `bounds` and is not a real word.
	///
	/// # Errors
	/// Returns `GenerationExhausted` if no acceptable word turns up within
	/// the attempt limit.
	pub fn random_word<R: Rng + ?Sized>(&self, rng: &mut R, bounds: LengthBounds) -> Result<String> {
		self.chain.random_sequence(rng, bounds, &NotRealWord(&self.words))
	}

	/// Merges another model into this one: chain counts are summed and
	/// real-word sets are united.
	pub fn merge(&mut self, other: &Self) {
		self.chain.merge(&other.chain);
		if !Arc::ptr_eq(&self.words, &other.words) {
			Arc::make_mut(&mut self.words).extend(other.words.iter().cloned());
		}
	}

	fn to_file(&self) -> ModelFile {
		ModelFile {
			ver: SUPPORTED_FILE_VER,
			markov: self.chain.encode(),
		}
	}

	/// Writes the chain as a versioned JSON document.
	pub fn write<W: Write>(&self, writer: W) -> Result<()> {
		serde_json::to_writer(writer, &self.to_file())?;
		Ok(())
	}

	/// Reads a chain written by [`WordModel::write`].
	///
	/// # Errors
	/// - `FileVersion` if the document has an unsupported `ver`; nothing is loaded.
	/// - `Json` / `MalformedModel` for undecodable documents.
	pub fn read<R: Read>(reader: R) -> Result<Self> {
		let file: ModelFile = serde_json::from_reader(reader)?;
		Ok(Self::from_parts(file.into_chain()?, Arc::default()))
	}

	/// Writes the JSON model to `path`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		let file = File::create(path).map_err(|e| FictionaryError::io(path, e))?;
		let mut writer = BufWriter::new(file);
		self.write(&mut writer)?;
		writer.flush().map_err(|e| FictionaryError::io(path, e))
	}

	/// Reads the JSON model at `path`.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let file = File::open(path).map_err(|e| FictionaryError::io(path, e))?;
		Self::read(BufReader::new(file))
	}

	/// Writes a compact `postcard` snapshot of the chain to `path`.
	///
	/// Holds the same versioned document as the JSON file.
	pub fn write_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		let bytes = postcard::to_stdvec(&self.to_file())?;
		std::fs::write(path, bytes).map_err(|e| FictionaryError::io(path, e))
	}

	/// Reads a snapshot written by [`WordModel::write_snapshot`].
	pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let bytes = std::fs::read(path).map_err(|e| FictionaryError::io(path, e))?;
		let file: ModelFile = postcard::from_bytes(&bytes)?;
		Ok(Self::from_parts(file.into_chain()?, Arc::default()))
	}
}
