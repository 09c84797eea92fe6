//! Opening book
//!
//! A trie of recorded openings keyed by cell index (`x + 8 * y`). Book lines are stored in
//! one canonical orientation; the orientation of the game being played is read off Black's
//! first move and locked for the rest of the game:
//!
//! | first move | transform |
//! |---|---|
//! | C4 | identity |
//! | D3 | mirror on the main diagonal |
//! | F5 | 180° rotation |
//! | E6 | mirror, then rotation |
//!
//! Each transform is its own inverse, so the same mapping converts incoming moves to book
//! coordinates and book moves back to board coordinates.
//!
//! Source format, one continuation per line:
//!
//! ```text
//! C4E3F6E6F5 ; 1.25
//! ```
//!
//! The score belongs to the last move of the line; intermediate nodes created by a line
//! score 0 and keep whatever score they were first created with.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use othello_board::{parse_square, BOARD_SIZE};
use tracing::{debug, info};

use crate::error::BookError;

const MIRROR_KEY: u8 = 19; // D3
const ROTATE_KEY: u8 = 37; // F5
const MIRROR_ROTATE_KEY: u8 = 44; // E6

#[derive(Debug, Clone, Default)]
struct BookNode {
    score: f64,
    /// `(key, node index)` in insertion order.
    children: Vec<(u8, usize)>,
}

/// Immutable trie shared by every [`OpeningBook`] cursor.
#[derive(Debug, Clone)]
pub struct BookTrie {
    nodes: Vec<BookNode>,
}

impl Default for BookTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl BookTrie {
    const ROOT: usize = 0;

    pub fn new() -> Self {
        BookTrie {
            nodes: vec![BookNode::default()],
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BookError> {
        let start = Instant::now();
        let path = path.as_ref();
        let trie = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!(
            path = %path.display(),
            nodes = trie.node_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "opening book loaded"
        );
        Ok(trie)
    }

    /// Build a trie from book text. Blank lines are skipped.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, BookError> {
        let mut trie = Self::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let (moves, score) = Self::parse_line(i + 1, &line)?;
            trie.insert(&moves, score);
        }
        Ok(trie)
    }

    /// Parse `MOVES ; score` into cell keys and the final move's score.
    pub fn parse_line(line_no: usize, text: &str) -> Result<(Vec<u8>, f64), BookError> {
        let malformed = |reason: String| BookError::Malformed {
            line: line_no,
            reason,
        };

        let (moves, score) = text
            .split_once(';')
            .ok_or_else(|| malformed("missing ';' separator".into()))?;
        let moves = moves.trim();
        let score = score.trim();

        if moves.is_empty() {
            return Err(malformed("empty move sequence".into()));
        }
        if !moves.is_ascii() || moves.len() % 2 != 0 {
            return Err(malformed(format!("cannot split {moves:?} into squares")));
        }
        let keys = moves
            .as_bytes()
            .chunks(2)
            .map(|pair| {
                std::str::from_utf8(pair)
                    .ok()
                    .and_then(parse_square)
                    .ok_or_else(|| malformed(format!("bad square {:?}", String::from_utf8_lossy(pair))))
            })
            .collect::<Result<Vec<u8>, _>>()?;
        let score = score
            .parse::<f64>()
            .map_err(|_| malformed(format!("bad score {score:?}")))?;
        Ok((keys, score))
    }

    /// Add one continuation. Existing nodes along the path keep their score.
    pub fn insert(&mut self, moves: &[u8], score: f64) {
        let mut node = Self::ROOT;
        for (i, &key) in moves.iter().enumerate() {
            node = match self.child(node, key) {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    let score = if i + 1 == moves.len() { score } else { 0.0 };
                    self.nodes.push(BookNode {
                        score,
                        children: Vec::new(),
                    });
                    self.nodes[node].children.push((key, child));
                    child
                }
            };
        }
    }

    /// Nodes including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn child(&self, node: usize, key: u8) -> Option<usize> {
        self.nodes[node]
            .children
            .iter()
            .find(|&&(k, _)| k == key)
            .map(|&(_, child)| child)
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.nodes[node].children.is_empty()
    }

    /// Highest-scoring child; the first inserted wins a tie.
    fn best_child(&self, node: usize) -> Option<(u8, usize)> {
        self.nodes[node]
            .children
            .iter()
            .copied()
            .fold(None, |best: Option<(u8, usize)>, (key, child)| match best {
                Some((_, b)) if self.nodes[b].score >= self.nodes[child].score => best,
                _ => Some((key, child)),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookState {
    /// No move recorded yet.
    Root,
    InBook,
    /// Off-book move or end of a recorded line. Terminal for the game.
    Abandoned,
}

/// Cursor into a [`BookTrie`] following one game.
#[derive(Debug, Clone)]
pub struct OpeningBook {
    trie: Arc<BookTrie>,
    node: usize,
    valid: bool,
    mirror: bool,
    rotate180: bool,
}

impl OpeningBook {
    pub fn new(trie: Arc<BookTrie>) -> Self {
        let valid = !trie.is_leaf(BookTrie::ROOT);
        OpeningBook {
            trie,
            node: BookTrie::ROOT,
            valid,
            mirror: false,
            rotate180: false,
        }
    }

    /// Record a move played on the board at `(x, y)`.
    ///
    /// The first move after the root fixes the orientation. A move the book does not know
    /// abandons it.
    pub fn proceed(&mut self, x: u8, y: u8) {
        if !self.valid {
            return;
        }
        if self.node == BookTrie::ROOT {
            match x + y * BOARD_SIZE {
                MIRROR_KEY => self.mirror = true,
                ROTATE_KEY => self.rotate180 = true,
                MIRROR_ROTATE_KEY => {
                    self.mirror = true;
                    self.rotate180 = true;
                }
                _ => {}
            }
        }

        let (cx, cy) = self.correct(x, y);
        match self.trie.child(self.node, cx + cy * BOARD_SIZE) {
            Some(child) => {
                self.node = child;
                self.check_leaf();
            }
            None => {
                debug!(x, y, "move left the opening book");
                self.valid = false;
            }
        }
    }

    /// Play the best recorded continuation, returned in board coordinates.
    pub fn read(&mut self) -> Option<(u8, u8)> {
        if !self.valid {
            return None;
        }
        let (key, child) = self.trie.best_child(self.node)?;
        self.node = child;
        self.check_leaf();
        Some(self.correct(key % BOARD_SIZE, key / BOARD_SIZE))
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn state(&self) -> BookState {
        if !self.valid {
            BookState::Abandoned
        } else if self.node == BookTrie::ROOT {
            BookState::Root
        } else {
            BookState::InBook
        }
    }

    pub fn mirror(&self) -> bool {
        self.mirror
    }

    pub fn rotate180(&self) -> bool {
        self.rotate180
    }

    /// Give up on the book for the rest of the game.
    pub fn abandon(&mut self) {
        self.valid = false;
    }

    fn correct(&self, x: u8, y: u8) -> (u8, u8) {
        let (mut x, mut y) = (x, y);
        if self.mirror {
            (x, y) = (y, x);
        }
        if self.rotate180 {
            (x, y) = (BOARD_SIZE - 1 - x, BOARD_SIZE - 1 - y);
        }
        (x, y)
    }

    fn check_leaf(&mut self) {
        if self.trie.is_leaf(self.node) {
            self.valid = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use othello_board::cell_coords;
    use std::io::{Cursor, Write};

    const BOOK: &str = "\
C4E3F6E6F5 ; 1.5
C4E3F4 ; -2.0

C4C3 ; 3.0
C4C5 ; 3.0
";

    fn book() -> OpeningBook {
        let trie = BookTrie::from_reader(Cursor::new(BOOK)).unwrap();
        OpeningBook::new(Arc::new(trie))
    }

    fn xy(square: &str) -> (u8, u8) {
        cell_coords(parse_square(square).unwrap())
    }

    #[test]
    fn test_parse_line() {
        let (moves, score) = BookTrie::parse_line(1, "C4E3F6 ; -0.75").unwrap();
        assert_eq!(moves, vec![26, 20, 45]);
        assert_eq!(score, -0.75);

        for bad in ["C4E3", "C4E ; 1", " ; 1", "C4Z9 ; 1", "C4 ; x"] {
            assert!(
                matches!(
                    BookTrie::parse_line(7, bad),
                    Err(BookError::Malformed { line: 7, .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_insert_shares_prefixes() {
        let trie = BookTrie::from_reader(Cursor::new(BOOK)).unwrap();
        // root, C4, E3, F6, E6, F5, F4, C3, C5
        assert_eq!(trie.node_count(), 9);
    }

    #[test]
    fn test_insert_keeps_existing_score() {
        let mut trie = BookTrie::new();
        trie.insert(&[26, 20], 5.0);
        trie.insert(&[26], 9.0);
        let c4 = trie.child(BookTrie::ROOT, 26).unwrap();
        assert_eq!(trie.nodes[c4].score, 0.0);
        let e3 = trie.child(c4, 20).unwrap();
        assert_eq!(trie.nodes[e3].score, 5.0);
    }

    #[test]
    fn test_best_child_first_inserted_wins_tie() {
        let trie = BookTrie::from_reader(Cursor::new(BOOK)).unwrap();
        let c4 = trie.child(BookTrie::ROOT, 26).unwrap();
        // C3 and C5 both score 3.0 under C4; C3 was inserted first. E3 scores 0.
        let (key, _) = trie.best_child(c4).unwrap();
        assert_eq!(key, parse_square("C3").unwrap());
    }

    #[test]
    fn test_identity_orientation() {
        let mut book = book();
        assert_eq!(book.state(), BookState::Root);
        let (x, y) = xy("C4");
        book.proceed(x, y);
        assert!(!book.mirror() && !book.rotate180());
        assert_eq!(book.state(), BookState::InBook);
        assert_eq!(book.read(), Some(xy("C3")));
        // C3 ends a recorded line.
        assert_eq!(book.state(), BookState::Abandoned);
        assert_eq!(book.read(), None);
    }

    #[test]
    fn test_d3_locks_mirror() {
        let mut book = book();
        let (x, y) = xy("D3");
        book.proceed(x, y);
        assert!(book.mirror());
        assert!(!book.rotate180());
        assert!(book.is_valid());

        // Book reply C3 mirrors back onto C3, which sits on the diagonal.
        assert_eq!(book.read(), Some(xy("C3")));

        // Later moves keep the mirror even though they are not diagnostic squares.
        let mut book = OpeningBook::new(Arc::new(
            BookTrie::from_reader(Cursor::new("C4E3F6E6F5 ; 1.5\n")).unwrap(),
        ));
        book.proceed(xy("D3").0, xy("D3").1);
        assert_eq!(book.read(), Some(xy("C5")));
        let (x, y) = xy("F6");
        book.proceed(x, y);
        assert!(book.is_valid());
        assert_eq!(book.read(), Some(xy("F5")));
        assert!(book.mirror());
    }

    #[test]
    fn test_f5_and_e6_orientations() {
        let trie = Arc::new(BookTrie::from_reader(Cursor::new("C4E3F6 ; 1\n")).unwrap());

        let mut rotated = OpeningBook::new(Arc::clone(&trie));
        rotated.proceed(xy("F5").0, xy("F5").1);
        assert!(rotated.rotate180() && !rotated.mirror());
        assert_eq!(rotated.read(), Some(xy("D6")));

        let mut both = OpeningBook::new(trie);
        both.proceed(xy("E6").0, xy("E6").1);
        assert!(both.rotate180() && both.mirror());
        assert_eq!(both.read(), Some(xy("F4")));
    }

    #[test]
    fn test_off_book_move_abandons() {
        let mut book = book();
        book.proceed(xy("C4").0, xy("C4").1);
        book.proceed(xy("B2").0, xy("B2").1);
        assert_eq!(book.state(), BookState::Abandoned);
        // Abandoned is terminal.
        book.proceed(xy("E3").0, xy("E3").1);
        assert!(!book.is_valid());
        assert_eq!(book.read(), None);
    }

    #[test]
    fn test_empty_book_is_invalid() {
        let book = OpeningBook::new(Arc::new(BookTrie::new()));
        assert!(!book.is_valid());
        assert_eq!(book.state(), BookState::Abandoned);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{BOOK}").unwrap();
        let trie = BookTrie::load(file.path()).unwrap();
        assert_eq!(trie.node_count(), 9);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "C4E3 ; 1\nC4E ; 2").unwrap();
        assert!(matches!(
            BookTrie::load(bad.path()),
            Err(BookError::Malformed { line: 2, .. })
        ));
        assert!(matches!(
            BookTrie::load("/nonexistent/book.txt"),
            Err(BookError::Io(_))
        ));
    }
}
