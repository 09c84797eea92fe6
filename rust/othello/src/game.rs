//! Turn-level game state on top of a [`Board`]
//!
//! Tracks whose turn it is, passes automatically when the side to move has no legal move,
//! and ends the game on a full board or when neither side can move. Every move pushes a
//! snapshot so moves can be taken back.
use crate::board::{Board, Snapshot};
use crate::{GameError, Player, MAX_PLY};

/// A request coming from whoever drives the game (a human prompt, a GUI, a script).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnCommand {
    Move(u8),
    /// Take back moves until it is again the current player's turn before their last move.
    Undo,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Played { cell: u8, flipped: u8 },
    Undone { moves: usize },
    Quit,
}

#[derive(Debug, Clone)]
struct MoveRecord {
    snapshot: Snapshot,
    player: Player,
    cell: u8,
    ply: u32,
}

#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    current_player: Player,
    ply: u32,
    game_over: bool,
    history: Vec<MoveRecord>,
}

impl Game {
    pub fn new() -> Self {
        Game {
            board: Board::new(),
            current_player: Player::Black,
            ply: 0,
            game_over: false,
            history: Vec::new(),
        }
    }

    /// Start from an arbitrary position with `player` to move.
    pub fn from_board(board: Board, player: Player) -> Self {
        let mut game = Game {
            ply: MAX_PLY.saturating_sub(board.empty_count()),
            board,
            current_player: player,
            game_over: false,
            history: Vec::new(),
        };
        if game.board.empty_count() == 0 {
            game.game_over = true;
        } else if !game.board.has_moves(player) {
            game.pass_turn();
        }
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Moves played so far. Passes do not count.
    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    /// Cells played so far, oldest first.
    pub fn moves(&self) -> impl Iterator<Item = (Player, u8)> + '_ {
        self.history.iter().map(|r| (r.player, r.cell))
    }

    /// Play `cell` for the current player, returning the number of discs flipped.
    pub fn play(&mut self, cell: u8) -> Result<u8, GameError> {
        if self.game_over {
            return Err(GameError::GameOver);
        }
        let snapshot = self.board.snapshot();
        let flipped = self.board.apply_move(cell, self.current_player)?;
        self.history.push(MoveRecord {
            snapshot,
            player: self.current_player,
            cell,
            ply: self.ply,
        });
        self.ply += 1;

        if self.board.empty_count() == 0 {
            self.game_over = true;
            return Ok(flipped);
        }

        self.current_player = self.current_player.opponent();
        if !self.board.has_moves(self.current_player) {
            self.pass_turn();
        }
        Ok(flipped)
    }

    /// Pass turn to opponent (when no valid moves)
    pub fn pass_turn(&mut self) {
        self.current_player = self.current_player.opponent();

        // Neither player can move.
        if !self.board.has_moves(self.current_player) {
            self.game_over = true;
        }
    }

    /// `(black, white)` disc counts.
    pub fn piece_counts(&self) -> (u8, u8) {
        self.board.disc_counts()
    }

    /// Winner once the game is over, `None` while it runs or on a draw.
    pub fn winner(&self) -> Option<Player> {
        if !self.game_over {
            return None;
        }
        let (black, white) = self.piece_counts();
        match black.cmp(&white) {
            std::cmp::Ordering::Greater => Some(Player::Black),
            std::cmp::Ordering::Less => Some(Player::White),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Game::new();
    }

    /// Take back the last move, whoever played it.
    pub fn undo(&mut self) -> Result<(), GameError> {
        let record = self.history.pop().ok_or(GameError::NothingToUndo)?;
        self.rewind(&record);
        Ok(())
    }

    fn rewind(&mut self, record: &MoveRecord) {
        self.board.restore(&record.snapshot);
        self.current_player = record.player;
        self.ply = record.ply;
        self.game_over = false;
    }

    /// Take back moves until the current player is back before their own last move.
    fn undo_own_turn(&mut self) -> Result<usize, GameError> {
        let me = self.current_player;
        let position = self
            .history
            .iter()
            .rposition(|r| r.player == me)
            .ok_or(GameError::NothingToUndo)?;
        let undone = self.history.len() - position;
        let record = self.history[position].clone();
        self.history.truncate(position);
        self.rewind(&record);
        Ok(undone)
    }

    pub fn apply_command(&mut self, command: TurnCommand) -> Result<TurnOutcome, GameError> {
        match command {
            TurnCommand::Move(cell) => {
                let flipped = self.play(cell)?;
                Ok(TurnOutcome::Played { cell, flipped })
            }
            TurnCommand::Undo => {
                let moves = self.undo_own_turn()?;
                Ok(TurnOutcome::Undone { moves })
            }
            TurnCommand::Quit => Ok(TurnOutcome::Quit),
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
