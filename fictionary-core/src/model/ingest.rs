use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use log::{debug, info};

use super::request::Dictionary;
use super::word_model::WordModel;
use crate::error::{FictionaryError, Result};
use crate::io::{build_output_path, ensure_dir, list_files, read_file};

/// File holding the packaged real-word set, one word per line.
pub const WORDS_FILE: &str = "words.txt";

/// Returns the trimmed word if `line` is usable as training data.
///
/// Blank lines, words starting with an uppercase letter (proper nouns) and
/// words containing an apostrophe (contractions, possessives) are rejected.
/// So are words containing a comma, which state keys use as separator.
pub fn training_word(line: &str) -> Option<&str> {
	let word = line.trim();
	let first = word.chars().next()?;
	if first.is_uppercase() || word.contains(['\'', ',']) {
		return None;
	}
	Some(word)
}

/// Reads every usable training word from the given word-list files.
pub fn read_words<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<String>> {
	let mut words = Vec::new();
	for path in paths {
		let lines = read_file(path)?;
		let before = words.len();
		words.extend(lines.iter().filter_map(|line| training_word(line)).map(str::to_owned));
		debug!("{}: {} training words", path.as_ref().display(), words.len() - before);
	}
	Ok(words)
}

/// Trains a model on `words`, splitting the work across threads.
///
/// - Splits the words into chunks (CPU cores * factor)
/// - Trains a partial model per chunk on its own thread
/// - Merges partial models in chunk order, so ties between equal counts
///   keep the order of the input
pub fn build_model_from_words(words: Vec<String>) -> WordModel {
	if words.is_empty() {
		return WordModel::new();
	}

	let cpus = num_cpus::get();
	let factor = 8;
	let chunks = cpus * factor;
	let chunk_size = words.len().div_ceil(chunks).max(1);

	let (tx, rx) = mpsc::channel();
	for (index, chunk) in words.chunks(chunk_size).enumerate() {
		let tx = tx.clone();
		let chunk: Vec<String> = chunk.to_vec();

		thread::spawn(move || {
			let mut partial_model = WordModel::new();
			for word in &chunk {
				partial_model.feed(word);
			}
			// The receiver outlives every worker
			let _ = tx.send((index, partial_model));
		});
	}
	drop(tx);

	let mut partial_models: Vec<(usize, WordModel)> = rx.iter().collect();
	partial_models.sort_by_key(|(index, _)| *index);

	let mut final_model = WordModel::new();
	for (_, partial_model) in &partial_models {
		final_model.merge(partial_model);
	}
	final_model
}

/// Reads the word-list files and trains a model on them.
pub fn build_model<P: AsRef<Path>>(paths: &[P]) -> Result<WordModel> {
	let words = read_words(paths)?;
	info!("Training on {} words from {} files", words.len(), paths.len());
	Ok(build_model_from_words(words))
}

/// Word-list files making up each dictionary.
///
/// Mirrors the ispell layout: `english.*` lists are shared, `british.*`
/// and `american.*` add the regional spellings, `all` takes every file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileSets {
	pub all: Vec<PathBuf>,
	pub british: Vec<PathBuf>,
	pub american: Vec<PathBuf>,
}

impl FileSets {
	/// Collects the file sets from a word-list directory.
	pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
		let dir = dir.as_ref();
		let english = list_files(dir, "english.")?;
		let mut british = english.clone();
		british.extend(list_files(dir, "british.")?);
		let mut american = english;
		american.extend(list_files(dir, "american.")?);

		Ok(Self {
			all: list_files(dir, "")?,
			british,
			american,
		})
	}

	pub fn files(&self, dictionary: Dictionary) -> &[PathBuf] {
		match dictionary {
			Dictionary::All => &self.all,
			Dictionary::British => &self.british,
			Dictionary::American => &self.american,
		}
	}
}

/// Outcome of packaging one dictionary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackagedDictionary {
	pub dictionary: Dictionary,
	pub path: PathBuf,
	pub states: usize,
	pub words: usize,
}

/// Builds every dictionary from `wordlist_dir` and writes the packaged data
/// files into `out_dir`: one `<name>.json` model per dictionary plus the
/// shared `words.txt` real-word list.
///
/// # Errors
/// Returns an error if a dictionary has no word-list files, or on I/O failure.
pub fn package<P, Q>(wordlist_dir: P, out_dir: Q) -> Result<Vec<PackagedDictionary>>
where
	P: AsRef<Path>,
	Q: AsRef<Path>,
{
	let sets = FileSets::from_dir(&wordlist_dir)?;
	let out_dir = out_dir.as_ref();
	ensure_dir(out_dir)?;

	let mut real_words = BTreeSet::new();
	let mut packaged = Vec::with_capacity(Dictionary::ALL.len());
	for dictionary in Dictionary::ALL {
		let files = sets.files(dictionary);
		if files.is_empty() {
			return Err(FictionaryError::NoWordLists {
				dictionary: dictionary.to_string(),
				dir: wordlist_dir.as_ref().display().to_string(),
			});
		}

		info!("Generating '{dictionary}' dictionary...");
		let model = build_model(files)?;
		let path = build_output_path(out_dir, dictionary.name(), "json");
		model.save(&path)?;
		real_words.extend(model.words().iter().cloned());

		packaged.push(PackagedDictionary {
			dictionary,
			path,
			states: model.chain().len(),
			words: model.word_count(),
		});
	}

	let words_path = out_dir.join(WORDS_FILE);
	let file = File::create(&words_path).map_err(|e| FictionaryError::io(&words_path, e))?;
	let mut writer = BufWriter::new(file);
	for word in &real_words {
		writeln!(writer, "{word}").map_err(|e| FictionaryError::io(&words_path, e))?;
	}
	writer.flush().map_err(|e| FictionaryError::io(&words_path, e))?;
	info!("Wrote {} real words to {}", real_words.len(), words_path.display());

	Ok(packaged)
}
