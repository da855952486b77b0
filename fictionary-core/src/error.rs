//! Error types for fictionary.
//!
//! Three families of failure:
//! - Caller mistakes: impossible length constraints, unknown dictionary names
//! - Data problems: unreadable, malformed or wrong-version model files
//! - Broken invariants: out-of-range picks and walks into untrained states

use std::path::PathBuf;

use thiserror::Error;

/// Model file version this build can read and write.
pub const SUPPORTED_FILE_VER: u32 = 1;

/// Top-level error type for fictionary.
#[derive(Debug, Error)]
pub enum FictionaryError {
	#[error("Value of i ({index}) was greater than max index ({})", max_index(.total))]
	OutOfRange { index: u64, total: u64 },

	#[error("Couldn't find a valid word in {attempts} iterations - it looks like something is wrong!")]
	GenerationExhausted { attempts: usize },

	#[error("Attempt to read file of version {found}, but this version of fictionary can only read version {supported}")]
	FileVersion { found: u32, supported: u32 },

	#[error("No transitions trained for state {0:?}")]
	UntrainedState(String),

	#[error("Malformed model data: {0}")]
	MalformedModel(String),

	#[error("Words cannot have a max-length shorter than their min-length! ({min} > {max})")]
	InvalidLengthRange { min: usize, max: usize },

	#[error("Unknown dictionary {0:?}: expected american, british, or all")]
	UnknownDictionary(String),

	#[error("No word lists for the {dictionary} dictionary in {dir}")]
	NoWordLists { dictionary: String, dir: String },

	#[error("IO error: {context}")]
	Io {
		context: String,
		#[source]
		source: std::io::Error,
	},

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Snapshot error: {0}")]
	Snapshot(#[from] postcard::Error),
}

impl FictionaryError {
	/// Wraps an I/O error with the path that caused it.
	pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io {
			context: path.into().display().to_string(),
			source,
		}
	}
}

fn max_index(total: &u64) -> i128 {
	i128::from(*total) - 1
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FictionaryError>;
