//! Fail-soft alpha-beta in negamax form
//!
//! Values returned below `alpha` are upper bounds, values at or above `beta` lower bounds,
//! anything in between is exact.

use othello_board::Player;

use super::{Leaf, Searcher};

impl<'a, L: Leaf> Searcher<'a, L> {
    /// `ordered` enables reordering of children at heights >= `order_min_height`.
    pub(super) fn alpha_beta_node(
        &mut self,
        player: Player,
        height: u32,
        mut alpha: f64,
        beta: f64,
        passed: bool,
        ordered: bool,
    ) -> f64 {
        self.nodes += 1;
        if height == 0 {
            return self.leaf.evaluate(self.board, player);
        }

        let mut moves = self.board.placeable_cells(player);
        if moves.is_empty() {
            if passed {
                return self.leaf.evaluate(self.board, player);
            }
            return -self.alpha_beta_node(player.opponent(), height, -beta, -alpha, true, ordered);
        }
        if ordered && height >= self.limits.order_min_height {
            self.order_moves(&mut moves, player, self.ordering);
        }

        let snapshot = self.board.snapshot();
        let mut best = f64::NEG_INFINITY;
        for cell in moves {
            self.board.apply_legal(cell, player);
            let value =
                -self.alpha_beta_node(player.opponent(), height - 1, -beta, -alpha, false, ordered);
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
