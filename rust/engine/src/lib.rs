//! Othello engine
//!
//! Plays Othello on top of the line-indexed [`othello_board::Board`]:
//! - [`eval`]: stage-indexed pattern weights and the position evaluator
//! - [`search`]: alpha-beta and negascout with move ordering
//! - [`book`]: symmetry-aware opening book
//! - [`controller`]: per-move choice between book, midgame and endgame search
//! - [`config`]: search heights and data file locations, loaded from YAML
//!
//! With the `python` feature the crate also builds the `othello_engine` Python module used
//! by the offline weight trainer.

pub mod book;
pub mod config;
pub mod controller;
pub mod error;
pub mod eval;
pub mod search;

#[cfg(feature = "python")]
mod bindings;

pub use book::{BookState, BookTrie, OpeningBook};
pub use config::{ConfigError, EngineConfig};
pub use controller::{play_game, Ai, GameRecord, Phase};
pub use error::{BookError, EngineError, EngineResult, WeightsError};
pub use eval::{stage_for_ply, Evaluator, Weights, STAGE_COUNT};
pub use search::{Algorithm, Leaf, Material, MoveOrdering, SearchLimits, SearchOutcome, Searcher};
