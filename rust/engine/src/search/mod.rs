//! Game-tree search
//!
//! Depth-first negamax over a single mutable [`Board`]. Every child is played with
//! `apply_legal` and taken back by restoring the snapshot taken before it, so sibling moves
//! always start from the same position.
//!
//! ## Module Organization
//!
//! - `alphabeta` - fail-soft alpha-beta, optionally reordering children
//! - `negascout` - principal-variation search falling back to alpha-beta near the leaves
//! - `ordering` - move ordering by one-ply evaluation or by opponent mobility
//!
//! Passing: a side without legal moves passes at the same height; two passes in a row end
//! the game and the leaf value is returned.

mod alphabeta;
mod negascout;
mod ordering;

use std::time::{Duration, Instant};

use othello_board::{Board, Player};
use tracing::debug;

use crate::eval::Evaluator;

/// Scores a position from `player`'s side.
pub trait Leaf {
    fn evaluate(&self, board: &Board, player: Player) -> f64;
}

impl Leaf for Evaluator {
    #[inline]
    fn evaluate(&self, board: &Board, player: Player) -> f64 {
        self.score(board, player)
    }
}

/// Exact disc difference, the leaf of the endgame solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct Material;

impl Leaf for Material {
    #[inline]
    fn evaluate(&self, board: &Board, player: Player) -> f64 {
        f64::from(board.material_diff(player))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    AlphaBeta,
    NegaScout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOrdering {
    /// Ascending cell index.
    None,
    /// Best one-ply leaf value for the mover first.
    ByEvaluation,
    /// Fewest opponent replies first.
    ByOpponentMobility,
}

/// Heights at which the search switches behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Alpha-beta nodes at least this high reorder their children.
    pub order_min_height: u32,
    /// Negascout nodes below this height hand over to plain, unordered alpha-beta.
    pub scout_min_height: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            order_min_height: 3,
            scout_min_height: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub cell: u8,
    pub score: f64,
    pub nodes: u64,
    pub elapsed: Duration,
}

pub struct Searcher<'a, L: Leaf> {
    board: &'a mut Board,
    leaf: &'a L,
    limits: SearchLimits,
    ordering: MoveOrdering,
    nodes: u64,
}

impl<'a, L: Leaf> Searcher<'a, L> {
    pub fn new(board: &'a mut Board, leaf: &'a L, limits: SearchLimits) -> Self {
        Searcher {
            board,
            leaf,
            limits,
            ordering: MoveOrdering::None,
            nodes: 0,
        }
    }

    /// Ordering used by [`Searcher::alpha_beta`] and [`Searcher::nega_scout`] when called directly.
    pub fn with_ordering(mut self, ordering: MoveOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Nodes visited since the searcher was created.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Pick `player`'s move by searching every root move `height` plies deep.
    ///
    /// Root moves are tried in `ordering` order and the first one reaching the best value
    /// wins. Returns `None` when `player` has no legal move.
    pub fn best_move(
        &mut self,
        player: Player,
        height: u32,
        algorithm: Algorithm,
        ordering: MoveOrdering,
    ) -> Option<SearchOutcome> {
        let start = Instant::now();
        let nodes_before = self.nodes;
        self.ordering = ordering;

        let mut moves = self.board.placeable_cells(player);
        if moves.is_empty() {
            return None;
        }
        self.order_moves(&mut moves, player, ordering);

        let child_height = height.saturating_sub(1);
        let snapshot = self.board.snapshot();
        let mut best: Option<(u8, f64)> = None;
        let mut alpha = f64::NEG_INFINITY;
        for cell in moves {
            self.board.apply_legal(cell, player);
            let value = -match algorithm {
                Algorithm::AlphaBeta => self.alpha_beta_node(
                    player.opponent(),
                    child_height,
                    f64::NEG_INFINITY,
                    -alpha,
                    false,
                    true,
                ),
                Algorithm::NegaScout => self.nega_scout_node(
                    player.opponent(),
                    child_height,
                    f64::NEG_INFINITY,
                    -alpha,
                    false,
                ),
            };
            self.board.restore(&snapshot);

            if best.map_or(true, |(_, score)| value > score) {
                alpha = alpha.max(value);
                best = Some((cell, value));
            }
        }

        let (cell, score) = best?;
        let outcome = SearchOutcome {
            cell,
            score,
            nodes: self.nodes - nodes_before,
            elapsed: start.elapsed(),
        };
        debug!(
            ?player,
            ?algorithm,
            height,
            cell,
            score,
            nodes = outcome.nodes,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "search finished"
        );
        Some(outcome)
    }

    /// Fail-soft alpha-beta value of the position for `player`.
    pub fn alpha_beta(&mut self, player: Player, height: u32, alpha: f64, beta: f64) -> f64 {
        self.alpha_beta_node(player, height, alpha, beta, false, true)
    }

    /// Negascout value of the position for `player`.
    pub fn nega_scout(&mut self, player: Player, height: u32, alpha: f64, beta: f64) -> f64 {
        self.nega_scout_node(player, height, alpha, beta, false)
    }
}
