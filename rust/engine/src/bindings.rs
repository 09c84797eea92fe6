//! PyO3 bindings for the Othello engine
//! Exposes the board, feature extraction and move selection to the Python trainer
use std::path::PathBuf;
use std::sync::Arc;

use ndarray::Array2;
use numpy::{PyArray1, PyArray2};
use othello_board::{cell_coords, Game, GameError, Player, CELL_COUNT, FEATURE_GROUP, GROUP_SIZES};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::book::{BookTrie, OpeningBook};
use crate::config::EngineConfig;
use crate::controller::Ai;
use crate::error::EngineError;
use crate::eval::{Evaluator, Weights};

fn engine_err(err: EngineError) -> PyErr {
    PyRuntimeError::new_err(err.to_string())
}

/// Python wrapper for an Othello game
///
/// Passes happen automatically: after a move the side to move is always one with a legal
/// move, unless the game is over.
#[pyclass]
pub struct OthelloGame {
    game: Game,
}

#[pymethods]
impl OthelloGame {
    /// Create a new game with the standard initial setup
    #[new]
    pub fn new() -> Self {
        Self { game: Game::new() }
    }

    pub fn reset(&mut self) {
        self.game.reset();
    }

    /// Apply a move for the current player
    ///
    /// Args:
    ///     action (int): Position on the board (0-63), where action = row * 8 + col
    ///
    /// Returns:
    ///     tuple: (valid, pieces_flipped, game_over)
    ///
    /// Raises:
    ///     ValueError: If action is out of range [0, 63]
    pub fn step(&mut self, action: usize) -> PyResult<(bool, u8, bool)> {
        if action >= CELL_COUNT {
            return Err(PyValueError::new_err(format!(
                "Action {} is out of range. Must be between 0 and 63 (inclusive).",
                action
            )));
        }

        match self.game.play(action as u8) {
            Ok(flipped) => Ok((true, flipped, self.game.is_over())),
            // Invalid moves are reported, not raised, so the trainer can penalise them.
            Err(GameError::IllegalMove { .. }) | Err(GameError::GameOver) => {
                Ok((false, 0, self.game.is_over()))
            }
            Err(err) => Err(PyValueError::new_err(err.to_string())),
        }
    }

    /// Board as an (8, 8) uint8 array: 0 = empty, 1 = black, 2 = white
    pub fn get_board<'py>(&self, py: Python<'py>) -> PyResult<&'py PyArray2<u8>> {
        let state = self.game.board().to_state();
        let array = Array2::from_shape_fn((8, 8), |(row, col)| state[row * 8 + col]);
        Ok(PyArray2::from_owned_array(py, array))
    }

    /// (64,) bool array, True where the current player may move
    pub fn get_valid_moves<'py>(&self, py: Python<'py>) -> PyResult<&'py PyArray1<bool>> {
        let mut moves = [false; CELL_COUNT];
        if !self.game.is_over() {
            for cell in self.game.board().placeable_cells(self.game.current_player()) {
                moves[cell as usize] = true;
            }
        }
        Ok(PyArray1::from_slice(py, &moves))
    }

    /// (46,) uint32 array of pattern codes; `feature_groups()` maps each to its weight table
    pub fn get_features<'py>(&self, py: Python<'py>) -> PyResult<&'py PyArray1<u32>> {
        Ok(PyArray1::from_slice(py, &self.game.board().features()))
    }

    /// 0 for Black, 1 for White
    pub fn get_current_player(&self) -> u8 {
        self.game.current_player().index() as u8
    }

    /// (black_count, white_count)
    pub fn get_piece_counts(&self) -> (u8, u8) {
        self.game.piece_counts()
    }

    /// 0 = Black wins, 1 = White wins, 2 = draw, 3 = game not finished
    pub fn get_winner(&self) -> u8 {
        if !self.game.is_over() {
            return 3;
        }
        match self.game.winner() {
            Some(Player::Black) => 0,
            Some(Player::White) => 1,
            None => 2,
        }
    }

    /// Moves played so far
    pub fn ply(&self) -> u32 {
        self.game.ply()
    }

    /// Take back the last move
    pub fn undo(&mut self) -> PyResult<()> {
        self.game
            .undo()
            .map_err(|err| PyValueError::new_err(err.to_string()))
    }
}

/// Move selection with the pattern evaluator and optional opening book
#[pyclass]
pub struct Engine {
    config: EngineConfig,
    evaluator: Evaluator,
    book: Option<Arc<BookTrie>>,
}

#[pymethods]
impl Engine {
    #[new]
    #[pyo3(signature = (weights_dir=None, book_path=None, mid_height=None))]
    pub fn new(
        weights_dir: Option<PathBuf>,
        book_path: Option<PathBuf>,
        mid_height: Option<u32>,
    ) -> PyResult<Self> {
        let mut config = EngineConfig {
            weights_dir,
            book_path,
            ..EngineConfig::default()
        };
        if let Some(height) = mid_height {
            config.mid_height = height;
        }
        config.validate().map_err(|err| engine_err(err.into()))?;

        let weights = match &config.weights_dir {
            Some(dir) => Weights::load_dir(dir).map_err(|err| engine_err(err.into()))?,
            None => Weights::zeroed(),
        };
        let book = match &config.book_path {
            Some(path) => Some(Arc::new(
                BookTrie::load(path).map_err(|err| engine_err(err.into()))?,
            )),
            None => None,
        };
        Ok(Self {
            config,
            evaluator: Evaluator::new(Arc::new(weights)),
            book,
        })
    }

    /// Best move (0-63) for the side to move in `game`
    pub fn select_move(&self, game: &OthelloGame) -> PyResult<u8> {
        let game = &game.game;
        // Replay the game into a fresh book cursor so any position can be asked about.
        let book = self.book.as_ref().map(|trie| {
            let mut book = OpeningBook::new(Arc::clone(trie));
            for (_, cell) in game.moves() {
                let (x, y) = cell_coords(cell);
                book.proceed(x, y);
            }
            book
        });
        let mut ai = Ai::new(
            game.current_player(),
            self.config.clone(),
            self.evaluator.clone(),
            book,
        );
        ai.select_move(game.board(), game.ply()).map_err(engine_err)
    }
}

/// Weight table index of each of the 46 features
#[pyfunction]
fn feature_groups() -> Vec<usize> {
    FEATURE_GROUP.to_vec()
}

/// Number of pattern codes in each weight table
#[pyfunction]
fn group_sizes() -> Vec<usize> {
    GROUP_SIZES.to_vec()
}

/// Python module definition
///
/// This module can be imported in Python as `othello_engine`
#[pymodule]
fn othello_engine(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<OthelloGame>()?;
    m.add_class::<Engine>()?;
    m.add_function(wrap_pyfunction!(feature_groups, m)?)?;
    m.add_function(wrap_pyfunction!(group_sizes, m)?)?;
    Ok(())
}
