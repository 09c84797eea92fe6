//! Move selection across the three phases of a game
//!
//! - Book: follow the opening book while it still matches the game.
//! - Midgame: alpha-beta over the pattern evaluator, `mid_height` plies deep, children
//!   ordered by one-ply evaluation.
//! - Endgame: once `ply >= 60 - fin_height`, negascout to the end of the game on exact disc
//!   difference, children ordered by opponent mobility.

use std::sync::Arc;

use othello_board::{cell_coords, cell_index, square_name, Board, Game, Player, MAX_PLY};
use tracing::{debug, info, warn};

use crate::book::{BookTrie, OpeningBook};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::eval::{Evaluator, Weights};
use crate::search::{Algorithm, Material, MoveOrdering, Searcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Book,
    Midgame,
    Endgame,
}

/// One engine player.
#[derive(Debug, Clone)]
pub struct Ai {
    player: Player,
    config: EngineConfig,
    evaluator: Evaluator,
    book: Option<OpeningBook>,
    phase: Phase,
}

impl Ai {
    pub fn new(
        player: Player,
        config: EngineConfig,
        evaluator: Evaluator,
        book: Option<OpeningBook>,
    ) -> Self {
        let phase = if book.as_ref().is_some_and(OpeningBook::is_valid) {
            Phase::Book
        } else {
            Phase::Midgame
        };
        Ai {
            player,
            config,
            evaluator,
            book,
            phase,
        }
    }

    /// Load weights and book named by `config`. Missing entries fall back to zero weights
    /// and no book.
    pub fn from_config(player: Player, config: &EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let weights = match &config.weights_dir {
            Some(dir) => Weights::load_dir(dir)?,
            None => Weights::zeroed(),
        };
        let book = match &config.book_path {
            Some(path) => Some(OpeningBook::new(Arc::new(BookTrie::load(path)?))),
            None => None,
        };
        Ok(Self::new(
            player,
            config.clone(),
            Evaluator::new(Arc::new(weights)),
            book,
        ))
    }

    pub fn player(&self) -> Player {
        self.player
    }

    /// Phase used for the most recent move, or the starting phase before any move.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn book(&self) -> Option<&OpeningBook> {
        self.book.as_ref()
    }

    /// Tell the engine about a move played on the board. Only the opponent's moves advance
    /// the book; the engine's own book moves were already consumed by `read`.
    pub fn observe(&mut self, cell: u8, mover: Player) {
        if mover == self.player {
            return;
        }
        if let Some(book) = self.book.as_mut() {
            let (x, y) = cell_coords(cell);
            book.proceed(x, y);
        }
    }

    /// Choose a move for this engine's side. `ply` is the number of moves played so far.
    pub fn select_move(&mut self, board: &Board, ply: u32) -> EngineResult<u8> {
        let player = self.player;
        if !board.has_moves(player) {
            return Err(EngineError::NoLegalMove { player });
        }

        if let Some(cell) = self.book_move(board) {
            self.enter(Phase::Book, ply);
            return Ok(cell);
        }

        let mut scratch = board.clone();
        let limits = self.config.search_limits();
        let outcome = if ply < self.config.fin_phase() {
            self.enter(Phase::Midgame, ply);
            Searcher::new(&mut scratch, &self.evaluator, limits).best_move(
                player,
                self.config.mid_height,
                Algorithm::AlphaBeta,
                MoveOrdering::ByEvaluation,
            )
        } else {
            self.enter(Phase::Endgame, ply);
            let height = MAX_PLY.saturating_sub(ply).max(1);
            Searcher::new(&mut scratch, &Material, limits).best_move(
                player,
                height,
                Algorithm::NegaScout,
                MoveOrdering::ByOpponentMobility,
            )
        };

        outcome
            .map(|outcome| outcome.cell)
            .ok_or(EngineError::NoLegalMove { player })
    }

    /// Next book move if the book is still in play and proposes a legal move.
    fn book_move(&mut self, board: &Board) -> Option<u8> {
        let book = self.book.as_mut().filter(|book| book.is_valid())?;
        let (x, y) = book.read()?;
        let cell = cell_index(x, y);
        if board.placeable(cell, self.player) {
            debug!(player = ?self.player, square = %square_name(cell), "book move");
            return Some(cell);
        }
        warn!(
            player = ?self.player,
            square = %square_name(cell),
            "opening book proposed an illegal move, falling back to search"
        );
        book.abandon();
        None
    }

    fn enter(&mut self, phase: Phase, ply: u32) {
        if self.phase != phase {
            info!(player = ?self.player, from = ?self.phase, to = ?phase, ply, "phase change");
            self.phase = phase;
        }
    }
}

/// Result of one engine-versus-engine game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub moves: Vec<(Player, u8)>,
    pub passes: u32,
    pub black: u8,
    pub white: u8,
}

impl GameRecord {
    /// `None` on a draw.
    pub fn winner(&self) -> Option<Player> {
        match self.black.cmp(&self.white) {
            std::cmp::Ordering::Greater => Some(Player::Black),
            std::cmp::Ordering::Less => Some(Player::White),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Moves as concatenated squares, the same notation the opening book uses.
    pub fn transcript(&self) -> String {
        self.moves.iter().map(|&(_, cell)| square_name(cell)).collect()
    }
}

/// Play a full game between two engines, `black` moving first.
pub fn play_game(black: &mut Ai, white: &mut Ai) -> EngineResult<GameRecord> {
    debug_assert_eq!(black.player(), Player::Black);
    debug_assert_eq!(white.player(), Player::White);

    let mut game = Game::new();
    let mut passes = 0;
    while !game.is_over() {
        let mover = game.current_player();
        let (ai, other) = match mover {
            Player::Black => (&mut *black, &mut *white),
            Player::White => (&mut *white, &mut *black),
        };
        let cell = ai.select_move(game.board(), game.ply())?;
        game.play(cell)?;
        ai.observe(cell, mover);
        other.observe(cell, mover);
        debug!(ply = game.ply(), player = ?mover, square = %square_name(cell), "move played");

        if !game.is_over() && game.current_player() == mover {
            passes += 1;
            debug!(player = ?mover.opponent(), "pass");
        }
    }

    let (black_discs, white_discs) = game.piece_counts();
    Ok(GameRecord {
        moves: game.moves().collect(),
        passes,
        black: black_discs,
        white: white_discs,
    })
}
