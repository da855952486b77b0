use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use rand::Rng;

use super::ingest::WORDS_FILE;
use super::request::{Dictionary, LengthBounds};
use super::word_model::WordModel;
use crate::error::Result;
use crate::io::{build_output_path, ensure_dir, read_file};

/// Environment variable overriding the packaged data directory.
pub const DATA_DIR_ENV: &str = "FICTIONARY_DATA_DIR";

/// Application name, used for the per-user cache directory.
pub const APP_NAME: &str = "fictionary";

/// Where a [`ModelCollection`] finds its models.
///
/// - `data_dir`: packaged `<name>.json` models and `words.txt`
/// - `snapshot_dir`: optional cache of binary snapshots, one per model
/// - `refresh`: ignore existing snapshots and rewrite them from JSON
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataSource {
	pub data_dir: PathBuf,
	pub snapshot_dir: Option<PathBuf>,
	pub refresh: bool,
}

impl DataSource {
	/// Reads models from `data_dir` only, without snapshots.
	pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
		Self {
			data_dir: data_dir.into(),
			snapshot_dir: None,
			refresh: false,
		}
	}

	/// Default configuration.
	///
	/// - data directory from `FICTIONARY_DATA_DIR`, else the `data/`
	///   directory shipped with the workspace
	/// - snapshots under the user cache directory, when one exists
	pub fn from_env() -> Self {
		let data_dir = env::var_os(DATA_DIR_ENV)
			.map(PathBuf::from)
			.unwrap_or_else(Self::packaged_data_dir);
		Self {
			data_dir,
			snapshot_dir: Self::default_snapshot_dir(),
			refresh: false,
		}
	}

	/// `data/` directory shipped at the workspace root.
	pub fn packaged_data_dir() -> PathBuf {
		Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("data")
	}

	/// `<user cache dir>/fictionary`, if the platform has one.
	pub fn default_snapshot_dir() -> Option<PathBuf> {
		dirs::cache_dir().map(|dir| dir.join(APP_NAME))
	}

	pub fn with_snapshot_dir<P: Into<PathBuf>>(mut self, dir: Option<P>) -> Self {
		self.snapshot_dir = dir.map(Into::into);
		self
	}

	pub fn with_refresh(mut self, refresh: bool) -> Self {
		self.refresh = refresh;
		self
	}

	fn model_path(&self, dictionary: Dictionary) -> PathBuf {
		build_output_path(&self.data_dir, dictionary.name(), "json")
	}

	fn snapshot_path(&self, dictionary: Dictionary) -> Option<PathBuf> {
		self.snapshot_dir
			.as_ref()
			.map(|dir| build_output_path(dir, dictionary.name(), "bin"))
	}
}

/// Named, lazily loaded word models.
///
/// # Responsibilities
/// - Load each dictionary's model on first use, then keep it until `reset`
/// - Share one real-word set between all loaded models
/// - Validate length constraints before anything is loaded
///
/// The collection is owned by the host. A host that shares it between
/// threads wraps it in a `Mutex`, which also guarantees one load per name.
#[derive(Debug)]
pub struct ModelCollection {
	source: DataSource,
	models: HashMap<Dictionary, WordModel>,
	words: Option<Arc<HashSet<String>>>,
}

impl ModelCollection {
	pub fn new(source: DataSource) -> Self {
		Self {
			source,
			models: HashMap::new(),
			words: None,
		}
	}

	pub fn source(&self) -> &DataSource {
		&self.source
	}

	/// Returns the model for `dictionary`, loading it on first access.
	///
	/// # Errors
	/// Returns an error if the model file or the real-word list cannot be
	/// read, or if the model file has an unsupported version.
	pub fn get(&mut self, dictionary: Dictionary) -> Result<&WordModel> {
		match self.models.entry(dictionary) {
			Entry::Occupied(entry) => Ok(&*entry.into_mut()),
			Entry::Vacant(entry) => {
				let model = Self::load(&self.source, &mut self.words, dictionary)?;
				Ok(&*entry.insert(model))
			}
		}
	}

	/// Installs an already built model under `dictionary`, replacing any
	/// cached one.
	pub fn insert(&mut self, dictionary: Dictionary, model: WordModel) {
		self.models.insert(dictionary, model);
	}

	/// Names of the models loaded so far, in a stable order.
	pub fn loaded(&self) -> Vec<Dictionary> {
		let mut names: Vec<Dictionary> = self.models.keys().copied().collect();
		names.sort();
		names
	}

	/// Drops every cached model and the shared real-word set.
	pub fn reset(&mut self) {
		self.models.clear();
		self.words = None;
	}

	/// Generates one invented word from the `dictionary` model.
	///
	/// # Errors
	/// - `InvalidLengthRange` if `min_length > max_length`, before any load
	/// - load errors, see [`ModelCollection::get`]
	/// - `GenerationExhausted` if the model cannot satisfy the constraints
	pub fn random_word<R: Rng + ?Sized>(
		&mut self,
		rng: &mut R,
		min_length: usize,
		max_length: Option<usize>,
		dictionary: Dictionary,
	) -> Result<String> {
		let bounds = LengthBounds::new(min_length, max_length)?;
		self.get(dictionary)?.random_word(rng, bounds)
	}

	/// Generates `count` invented words from the `dictionary` model.
	///
	/// Same errors as [`ModelCollection::random_word`]; the first failure
	/// aborts the batch.
	pub fn random_words<R: Rng + ?Sized>(
		&mut self,
		rng: &mut R,
		count: usize,
		min_length: usize,
		max_length: Option<usize>,
		dictionary: Dictionary,
	) -> Result<Vec<String>> {
		let bounds = LengthBounds::new(min_length, max_length)?;
		let model = self.get(dictionary)?;
		(0..count).map(|_| model.random_word(rng, bounds)).collect()
	}

	fn load(
		source: &DataSource,
		shared_words: &mut Option<Arc<HashSet<String>>>,
		dictionary: Dictionary,
	) -> Result<WordModel> {
		let mut model = Self::load_chain(source, dictionary)?;

		let words = match shared_words {
			Some(words) => Arc::clone(words),
			None => Arc::clone(shared_words.insert(Arc::new(Self::load_words(&source.data_dir)?))),
		};
		model.attach_words(words);
		Ok(model)
	}

	fn load_chain(source: &DataSource, dictionary: Dictionary) -> Result<WordModel> {
		let snapshot = source.snapshot_path(dictionary);

		if let Some(path) = snapshot.as_ref().filter(|p| !source.refresh && p.is_file()) {
			match WordModel::read_snapshot(path) {
				Ok(model) => {
					info!("Loaded '{dictionary}' model from snapshot {}", path.display());
					return Ok(model);
				}
				Err(e) => warn!("Ignoring unreadable snapshot {}: {e}", path.display()),
			}
		}

		let path = source.model_path(dictionary);
		let model = WordModel::load(&path)?;
		info!("Loaded '{dictionary}' model from {} ({} states)", path.display(), model.chain().len());

		if let Some(path) = snapshot {
			// The snapshot is only a cache, failing to write it is not fatal
			let written = path
				.parent()
				.map_or(Ok(()), ensure_dir)
				.and_then(|_| model.write_snapshot(&path));
			if let Err(e) = written {
				warn!("Could not write snapshot {}: {e}", path.display());
			}
		}

		Ok(model)
	}

	fn load_words(data_dir: &Path) -> Result<HashSet<String>> {
		let path = data_dir.join(WORDS_FILE);
		let words: HashSet<String> = read_file(&path)?
			.iter()
			.map(|line| line.trim())
			.filter(|word| !word.is_empty())
			.map(str::to_owned)
			.collect();
		info!("Loaded {} real words from {}", words.len(), path.display());
		Ok(words)
	}
}
