//! Move ordering
//!
//! Both orderings play each candidate once, score the resulting position and restore the
//! board. Sorting is stable, so ties keep ascending cell order. Probes are not counted as
//! search nodes.

use othello_board::Player;

use super::{Leaf, MoveOrdering, Searcher};

impl<'a, L: Leaf> Searcher<'a, L> {
    pub(super) fn order_moves(&mut self, moves: &mut Vec<u8>, player: Player, ordering: MoveOrdering) {
        if moves.len() < 2 {
            return;
        }
        match ordering {
            MoveOrdering::None => {}
            MoveOrdering::ByEvaluation => {
                let mut scored = self.probe(moves, player, |searcher| {
                    searcher.leaf.evaluate(&*searcher.board, player)
                });
                scored.sort_by(|a, b| b.0.total_cmp(&a.0));
                write_back(moves, &scored);
            }
            MoveOrdering::ByOpponentMobility => {
                let opponent = player.opponent();
                let mut scored = self.probe(moves, player, |searcher| {
                    searcher.board.placeable_count(opponent)
                });
                scored.sort_by_key(|&(replies, _)| replies);
                write_back(moves, &scored);
            }
        }
    }

    fn probe<K>(
        &mut self,
        moves: &[u8],
        player: Player,
        mut key: impl FnMut(&Self) -> K,
    ) -> Vec<(K, u8)> {
        let snapshot = self.board.snapshot();
        moves
            .iter()
            .map(|&cell| {
                self.board.apply_legal(cell, player);
                let k = key(&*self);
                self.board.restore(&snapshot);
                (k, cell)
            })
            .collect()
    }
}

fn write_back<K>(moves: &mut [u8], scored: &[(K, u8)]) {
    for (slot, &(_, cell)) in moves.iter_mut().zip(scored) {
        *slot = cell;
    }
}
