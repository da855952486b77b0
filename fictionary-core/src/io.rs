use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FictionaryError, Result};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
/// - Invalid UTF-8 is replaced rather than rejected (ispell lists are
///   not always clean)
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let path = filename.as_ref();
	let bytes = fs::read(path).map_err(|e| FictionaryError::io(path, e))?;
	Ok(String::from_utf8_lossy(&bytes).lines().map(str::to_owned).collect())
}

/// Builds `<folder>/<stem>.<extension>`.
///
/// Example:
/// `data` + `"british"` + `"json"` → `data/british.json`
pub(crate) fn build_output_path<P: AsRef<Path>>(folder: P, stem: &str, extension: &str) -> PathBuf {
	let mut output = folder.as_ref().join(stem);
	output.set_extension(extension);
	output
}

/// Lists the regular files in `dir` whose name starts with `prefix`.
///
/// Returns full paths, sorted by name so that ingestion order is stable.
/// An empty prefix lists every file.
pub(crate) fn list_files<P: AsRef<Path>>(dir: P, prefix: &str) -> Result<Vec<PathBuf>> {
	let dir = dir.as_ref();
	let mut files = Vec::new();

	for entry in fs::read_dir(dir).map_err(|e| FictionaryError::io(dir, e))? {
		let path = entry.map_err(|e| FictionaryError::io(dir, e))?.path();
		if !path.is_file() {
			continue;
		}
		let matches = path
			.file_name()
			.map(|name| name.to_string_lossy().starts_with(prefix))
			.unwrap_or(false);
		if matches {
			files.push(path);
		}
	}

	files.sort();
	Ok(files)
}

/// Creates `dir` and its parents if needed.
pub(crate) fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<()> {
	let dir = dir.as_ref();
	fs::create_dir_all(dir).map_err(|e| FictionaryError::io(dir, e))
}
