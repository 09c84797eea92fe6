//! Negascout (principal variation search)
//!
//! The first child is searched with the full window, later children with a null window
//! just above `alpha`. A probe that lands inside the window is re-searched in full.
//! Nodes below `scout_min_height` go to unordered alpha-beta, where the probing overhead
//! no longer pays off.

use othello_board::Player;

use super::{Leaf, Searcher};

impl<'a, L: Leaf> Searcher<'a, L> {
    pub(super) fn nega_scout_node(
        &mut self,
        player: Player,
        height: u32,
        mut alpha: f64,
        beta: f64,
        passed: bool,
    ) -> f64 {
        if height == 0 || height < self.limits.scout_min_height {
            return self.alpha_beta_node(player, height, alpha, beta, passed, false);
        }
        self.nodes += 1;

        let opponent = player.opponent();
        let mut moves = self.board.placeable_cells(player);
        if moves.is_empty() {
            if passed {
                return self.leaf.evaluate(self.board, player);
            }
            return -self.nega_scout_node(opponent, height, -beta, -alpha, true);
        }
        self.order_moves(&mut moves, player, self.ordering);

        let snapshot = self.board.snapshot();
        self.board.apply_legal(moves[0], player);
        let mut best = -self.nega_scout_node(opponent, height - 1, -beta, -alpha, false);
        self.board.restore(&snapshot);
        if best >= beta {
            return best;
        }
        alpha = alpha.max(best);

        for &cell in &moves[1..] {
            self.board.apply_legal(cell, player);
            let mut value = -self.nega_scout_node(opponent, height - 1, -alpha - 1.0, -alpha, false);
            if value > alpha && value < beta {
                value = -self.nega_scout_node(opponent, height - 1, -beta, -alpha, false);
            }
            self.board.restore(&snapshot);

            if value >= beta {
                return value;
            }
            if value > best {
                best = value;
                alpha = alpha.max(value);
            }
        }
        best
    }
}
