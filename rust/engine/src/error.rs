//! Error types for the engine
//!
//! Weight and book files are read once at startup; any malformation there is reported with
//! enough position information to find the offending token. Search itself never fails
//! except when asked to move without a legal move.

use othello_board::{GameError, Player};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors reading or writing per-stage weight tables
#[derive(Error, Debug)]
pub enum WeightsError {
    #[error("failed to access weight file: {0}")]
    Io(#[from] std::io::Error),

    #[error("stage {stage}, group {group}: cannot parse {token:?} as a weight")]
    Parse {
        stage: usize,
        group: usize,
        token: String,
    },

    #[error("stage {stage}, group {group}: expected {expected} values, found {found}")]
    Count {
        stage: usize,
        group: usize,
        expected: usize,
        found: usize,
    },

    #[error("stage {stage}: missing line for group {group}")]
    MissingGroup { stage: usize, group: usize },

    #[error("stage {stage} is out of range (must be below {stages})")]
    StageOutOfRange { stage: usize, stages: usize },
}

/// Errors building the opening book
#[derive(Error, Debug)]
pub enum BookError {
    #[error("failed to read opening book: {0}")]
    Io(#[from] std::io::Error),

    #[error("opening book line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Weights(#[from] WeightsError),

    #[error(transparent)]
    Book(#[from] BookError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Game(#[from] GameError),

    /// Asked to move in a position where `player` has no legal move.
    #[error("{player:?} has no legal move")]
    NoLegalMove { player: Player },
}

pub type EngineResult<T> = Result<T, EngineError>;
