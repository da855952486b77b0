use rand::Rng;
use rand::seq::IndexedRandom;

use super::symbol::Symbol;
use crate::error::{FictionaryError, Result};

#[derive(Clone, Copy, Debug)]
struct Entry {
	symbol: Symbol,
	count: u64,
	/// Position of the first insertion, used to break count ties.
	order: usize,
}

/// Multiset of next symbols observed from one chain state.
///
/// Conceptually, the outgoing edges of a Markov chain node, weighted by
/// how many times each edge was observed during training.
///
/// ## Responsibilities:
/// - Accumulate occurrences during training
/// - Map a cumulative index onto a symbol (`pick`)
/// - Draw weighted or unweighted random symbols
/// - Merge with another counter (parallel ingestion support)
///
/// ## Invariants
/// - Every stored count is >= 1
/// - `entries` is sorted by descending count, ties by first insertion,
///   so `pick` is a pure function of the trained data
#[derive(Clone, Debug, Default)]
pub struct WeightedCounter {
	entries: Vec<Entry>,
	total: u64,
	inserted: usize,
}

impl WeightedCounter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `symbol`.
	pub fn add(&mut self, symbol: Symbol) {
		self.add_count(symbol, 1);
	}

	/// Records `count` occurrences of `symbol`. A zero count is ignored.
	pub fn add_count(&mut self, symbol: Symbol, count: u64) {
		if count == 0 {
			return;
		}
		self.total += count;

		let mut index = match self.entries.iter().position(|e| e.symbol == symbol) {
			Some(index) => {
				self.entries[index].count += count;
				index
			}
			None => {
				self.entries.push(Entry { symbol, count, order: self.inserted });
				self.inserted += 1;
				self.entries.len() - 1
			}
		};

		// Only this entry's key grew, so bubbling it up restores the order
		while index > 0 && Self::precedes(&self.entries[index], &self.entries[index - 1]) {
			self.entries.swap(index, index - 1);
			index -= 1;
		}
	}

	fn precedes(a: &Entry, b: &Entry) -> bool {
		a.count > b.count || (a.count == b.count && a.order < b.order)
	}

	/// Sum of all counts.
	pub fn total(&self) -> u64 {
		self.total
	}

	/// Number of distinct symbols.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Count recorded for `symbol`, 0 if never seen.
	pub fn count(&self, symbol: Symbol) -> u64 {
		self.entries
			.iter()
			.find(|e| e.symbol == symbol)
			.map_or(0, |e| e.count)
	}

	/// Symbols with their counts, most common first.
	pub fn most_common(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
		self.entries.iter().map(|e| (e.symbol, e.count))
	}

	/// Symbols with their counts, in first-insertion order.
	pub fn insertion_order(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
		let mut entries: Vec<&Entry> = self.entries.iter().collect();
		entries.sort_by_key(|e| e.order);
		entries.into_iter().map(|e| (e.symbol, e.count))
	}

	/// Returns the symbol whose cumulative range contains `i`.
	///
	/// Ranges are laid out in `most_common` order: the k-th symbol owns
	/// `[running_total, running_total + count)`.
	///
	/// # Errors
	/// Returns `OutOfRange` if `i >= total()`.
	pub fn pick(&self, i: u64) -> Result<Symbol> {
		let mut running = 0;
		for entry in &self.entries {
			running += entry.count;
			if i < running {
				return Ok(entry.symbol);
			}
		}
		Err(FictionaryError::OutOfRange { index: i, total: self.total })
	}

	/// Draws a random symbol.
	///
	/// - `weighted`: probability of a symbol is `count / total`.
	/// - unweighted: every distinct symbol is equally likely, whatever its count.
	///
	/// # Errors
	/// Returns `OutOfRange` if the counter is empty.
	pub fn random_choice<R: Rng + ?Sized>(&self, rng: &mut R, weighted: bool) -> Result<Symbol> {
		let empty = || FictionaryError::OutOfRange { index: 0, total: 0 };
		if !weighted {
			return self.entries.choose(rng).map(|e| e.symbol).ok_or_else(empty);
		}
		if self.total == 0 {
			return Err(empty());
		}
		self.pick(rng.random_range(0..self.total))
	}

	/// Sums the counts of `other` into this counter.
	///
	/// Symbols new to this counter are appended in `other`'s order.
	pub fn merge(&mut self, other: &Self) {
		for (symbol, count) in other.insertion_order() {
			self.add_count(symbol, count);
		}
	}
}

/// Two counters are equal when they map every index to the same symbol:
/// same counts, same tie order.
impl PartialEq for WeightedCounter {
	fn eq(&self, other: &Self) -> bool {
		self.total == other.total && self.most_common().eq(other.most_common())
	}
}

impl Eq for WeightedCounter {}

impl FromIterator<Symbol> for WeightedCounter {
	fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
		let mut counter = Self::new();
		for symbol in iter {
			counter.add(symbol);
		}
		counter
	}
}
