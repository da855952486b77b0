use std::fmt;

use crate::error::{FictionaryError, Result};

/// A single element of a trained sequence.
///
/// Words are framed by `Boundary` sentinels: two before the first character
/// (seeding the initial state) and one after the last (marking termination).
/// The sentinel is never emitted as output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
	Boundary,
	Char(char),
}

impl Symbol {
	/// Encodes the symbol for a model file: boundary becomes `""`.
	pub fn encode(self) -> String {
		match self {
			Symbol::Boundary => String::new(),
			Symbol::Char(c) => c.to_string(),
		}
	}

	/// Decodes a model file symbol.
	///
	/// # Errors
	/// Returns `MalformedModel` if the string holds more than one character.
	pub fn decode(s: &str) -> Result<Self> {
		let mut chars = s.chars();
		match (chars.next(), chars.next()) {
			(None, _) => Ok(Symbol::Boundary),
			(Some(c), None) => Ok(Symbol::Char(c)),
			_ => Err(FictionaryError::MalformedModel(format!("symbol {s:?} is not a single character"))),
		}
	}
}

impl From<char> for Symbol {
	fn from(c: char) -> Self {
		Symbol::Char(c)
	}
}

/// The two most recently seen symbols: the state of the order-2 chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(pub Symbol, pub Symbol);

impl StateKey {
	/// State every generation walk starts from.
	pub const INITIAL: StateKey = StateKey(Symbol::Boundary, Symbol::Boundary);

	/// Slides the window: drops the oldest symbol and appends `next`.
	pub fn advance(self, next: Symbol) -> Self {
		StateKey(self.1, next)
	}

	/// Encodes the key as `"<a>,<b>"`, so the initial state is `","`.
	pub fn encode(self) -> String {
		format!("{},{}", self.0.encode(), self.1.encode())
	}

	/// Decodes a key written by [`StateKey::encode`].
	///
	/// The separator is the first comma, so `','` itself is not representable
	/// as the leading symbol. Ingestion never trains words containing one.
	pub fn decode(s: &str) -> Result<Self> {
		let (a, b) = s
			.split_once(',')
			.ok_or_else(|| FictionaryError::MalformedModel(format!("state key {s:?} has no separator")))?;
		Ok(StateKey(Symbol::decode(a)?, Symbol::decode(b)?))
	}
}

impl fmt::Display for StateKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.encode())
	}
}
