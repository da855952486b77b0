//! Top-level module for the word model.
//!
//! Built bottom-up:
//! - Symbols and chain states (`Symbol`, `StateKey`)
//! - Weighted sampling over observed successors (`WeightedCounter`)
//! - The order-2 character chain and its retry loop (`MarkovChain`)
//! - Trained models with real-word filtering and persistence (`WordModel`)
//! - Word-list ingestion and packaging
//! - Named, lazily loaded models (`ModelCollection`)

/// Named access to pretrained models.
///
/// Loads each dictionary on first use (JSON or binary snapshot) and
/// caches it until reset.
pub mod collection;

/// Weighted multiset of successor symbols.
pub mod counter;

/// Word-list ingestion: line filtering, parallel training, and packaging
/// of the data files.
pub mod ingest;

/// Order-2 character Markov chain.
///
/// Handles training, lazy walks from the initial state, the bounded
/// generate-and-filter loop, and merging.
pub mod markov_chain;

/// Generation constraints (`LengthBounds`) and dictionary names.
pub mod request;

/// Chain symbols, states, and their model-file encoding.
pub mod symbol;

/// A chain plus its real-word set; versioned save/load.
pub mod word_model;
