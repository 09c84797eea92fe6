//! Pattern evaluation
//!
//! A position is scored as the sum of one learned weight per pattern feature plus the
//! board's line mobility balance, all from Black's side, then negated for White.
//! Weights come in 15 stages of 4 plies each; each stage holds one table per feature group.
//!
//! Weight files (`w0.txt` .. `w14.txt`) hold one line per group in group order, each line
//! a whitespace-separated list with one value per pattern code.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use othello_board::{Board, Player, FEATURE_GROUP, GROUP_COUNT, GROUP_SIZES, MAX_PLY};
use tracing::info;

use crate::error::WeightsError;

/// Plies per stage.
pub const STAGE_WIDTH: u32 = 4;

/// Number of weight stages.
pub const STAGE_COUNT: usize = (MAX_PLY / STAGE_WIDTH) as usize;

/// Stage for a position `ply` moves into the game, clamped to the last stage.
pub fn stage_for_ply(ply: u32) -> usize {
    ((ply / STAGE_WIDTH) as usize).min(STAGE_COUNT - 1)
}

fn stage_file(dir: &Path, stage: usize) -> std::path::PathBuf {
    dir.join(format!("w{stage}.txt"))
}

/// Weights of one stage, one table per feature group.
pub type StageWeights = Vec<Vec<f32>>;

#[derive(Debug, Clone)]
pub struct Weights {
    stages: Vec<StageWeights>,
}

impl Weights {
    /// All-zero tables, the starting point for training.
    pub fn zeroed() -> Self {
        let stage: StageWeights = GROUP_SIZES.iter().map(|&size| vec![0.0; size]).collect();
        Weights {
            stages: vec![stage; STAGE_COUNT],
        }
    }

    /// Load every stage from `dir/w{stage}.txt`.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, WeightsError> {
        let start = Instant::now();
        let dir = dir.as_ref();
        let stages = (0..STAGE_COUNT)
            .map(|stage| {
                let file = File::open(stage_file(dir, stage))?;
                Self::read_stage(stage, BufReader::new(file))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            dir = %dir.display(),
            stages = stages.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "weights loaded"
        );
        Ok(Weights { stages })
    }

    /// Parse one stage: a line per group with exactly `GROUP_SIZES[group]` values.
    pub fn read_stage(stage: usize, reader: impl BufRead) -> Result<StageWeights, WeightsError> {
        let mut lines = reader.lines();
        let mut tables = Vec::with_capacity(GROUP_COUNT);
        for (group, &expected) in GROUP_SIZES.iter().enumerate() {
            let line = lines
                .next()
                .ok_or(WeightsError::MissingGroup { stage, group })??;
            let table = line
                .split_whitespace()
                .map(|token| {
                    token.parse::<f32>().map_err(|_| WeightsError::Parse {
                        stage,
                        group,
                        token: token.to_string(),
                    })
                })
                .collect::<Result<Vec<f32>, _>>()?;
            if table.len() != expected {
                return Err(WeightsError::Count {
                    stage,
                    group,
                    expected,
                    found: table.len(),
                });
            }
            tables.push(table);
        }
        Ok(tables)
    }

    /// Write one stage in the format [`Weights::read_stage`] reads.
    pub fn write_stage(&self, stage: usize, mut writer: impl Write) -> Result<(), WeightsError> {
        let tables = self.stage(stage)?;
        for table in tables {
            for (i, value) in table.iter().enumerate() {
                if i > 0 {
                    writer.write_all(b" ")?;
                }
                write!(writer, "{value}")?;
            }
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write every stage to `dir/w{stage}.txt`, creating `dir` if needed.
    pub fn save_dir(&self, dir: impl AsRef<Path>) -> Result<(), WeightsError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        for stage in 0..self.stages.len() {
            let file = File::create(stage_file(dir, stage))?;
            self.write_stage(stage, BufWriter::new(file))?;
        }
        info!(dir = %dir.display(), stages = self.stages.len(), "weights saved");
        Ok(())
    }

    fn stage(&self, stage: usize) -> Result<&StageWeights, WeightsError> {
        self.stages.get(stage).ok_or(WeightsError::StageOutOfRange {
            stage,
            stages: self.stages.len(),
        })
    }

    #[inline]
    pub fn value(&self, stage: usize, group: usize, code: usize) -> f64 {
        f64::from(self.stages[stage][group][code])
    }

    pub fn set(&mut self, stage: usize, group: usize, code: usize, value: f32) {
        self.stages[stage][group][code] = value;
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// Scores positions from the shared weight tables.
#[derive(Debug, Clone)]
pub struct Evaluator {
    weights: Arc<Weights>,
}

impl Evaluator {
    pub fn new(weights: Arc<Weights>) -> Self {
        Evaluator { weights }
    }

    pub fn zeroed() -> Self {
        Self::new(Arc::new(Weights::zeroed()))
    }

    pub fn weights(&self) -> &Arc<Weights> {
        &self.weights
    }

    /// Sum of the stage's weights over the board's 46 features, from Black's side.
    pub fn pattern_sum(&self, board: &Board, stage: usize) -> f64 {
        board
            .features()
            .iter()
            .zip(FEATURE_GROUP.iter())
            .map(|(&code, &group)| self.weights.value(stage, group, code as usize))
            .sum()
    }

    /// Score from `player`'s side. The stage follows the disc count of `board` itself.
    pub fn score(&self, board: &Board, player: Player) -> f64 {
        let ply = MAX_PLY.saturating_sub(board.empty_count());
        let black = self.pattern_sum(board, stage_for_ply(ply))
            + f64::from(board.mobility_score(Player::Black));
        f64::from(player.sign()) * black
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use othello_board::{cell_index, FEATURE_COUNT};
    use std::io::Cursor;

    fn stage_text(fill: &str) -> String {
        GROUP_SIZES
            .iter()
            .map(|&size| vec![fill; size].join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_stage_for_ply() {
        assert_eq!(STAGE_COUNT, 15);
        assert_eq!(stage_for_ply(0), 0);
        assert_eq!(stage_for_ply(3), 0);
        assert_eq!(stage_for_ply(4), 1);
        assert_eq!(stage_for_ply(59), 14);
        assert_eq!(stage_for_ply(60), 14);
        assert_eq!(stage_for_ply(100), 14);
    }

    #[test]
    fn test_zeroed_shape() {
        let weights = Weights::zeroed();
        assert_eq!(weights.stage_count(), STAGE_COUNT);
        for (group, &size) in GROUP_SIZES.iter().enumerate() {
            assert_eq!(weights.value(14, group, size - 1), 0.0);
        }
    }

    #[test]
    fn test_read_stage() {
        let tables = Weights::read_stage(0, Cursor::new(stage_text("0.5"))).unwrap();
        assert_eq!(tables.len(), GROUP_COUNT);
        assert_eq!(tables[8].len(), 59049);
        assert!(tables.iter().flatten().all(|&v| v == 0.5));
    }

    #[test]
    fn test_read_stage_accepts_trailing_space() {
        let text: String = GROUP_SIZES
            .iter()
            .map(|&size| "0.0 ".repeat(size) + "\n")
            .collect();
        assert!(Weights::read_stage(3, Cursor::new(text)).is_ok());
    }

    #[test]
    fn test_read_stage_errors() {
        let missing = stage_text("0").lines().take(5).collect::<Vec<_>>().join("\n");
        assert!(matches!(
            Weights::read_stage(2, Cursor::new(missing)),
            Err(WeightsError::MissingGroup { stage: 2, group: 5 })
        ));

        let short = "0 0 0\n".to_string();
        assert!(matches!(
            Weights::read_stage(0, Cursor::new(short)),
            Err(WeightsError::Count {
                group: 0,
                expected: 6561,
                found: 3,
                ..
            })
        ));

        let bad = stage_text("0").replacen('0', "x", 1);
        match Weights::read_stage(7, Cursor::new(bad)) {
            Err(WeightsError::Parse { stage, group, token }) => {
                assert_eq!((stage, group), (7, 0));
                assert_eq!(token, "x");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_save_and_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut weights = Weights::zeroed();
        weights.set(0, 0, 1, 1.5);
        weights.set(14, 10, 19682, -2.25);
        weights.save_dir(dir.path()).unwrap();
        assert!(dir.path().join("w14.txt").exists());

        let loaded = Weights::load_dir(dir.path()).unwrap();
        assert_eq!(loaded.value(0, 0, 1), 1.5);
        assert_eq!(loaded.value(14, 10, 19682), -2.25);
        assert_eq!(loaded.value(7, 9, 100), 0.0);
    }

    #[test]
    fn test_load_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Weights::load_dir(dir.path()),
            Err(WeightsError::Io(_))
        ));
    }

    #[test]
    fn test_zero_weights_score_is_mobility() {
        let evaluator = Evaluator::zeroed();
        let board = Board::new();
        let mobility = f64::from(board.mobility_score(Player::Black));
        assert_eq!(evaluator.score(&board, Player::Black), mobility);
        assert_eq!(evaluator.score(&board, Player::White), -mobility);
    }

    #[test]
    fn test_pattern_sum_uses_feature_codes() {
        let mut weights = Weights::zeroed();
        let board = Board::new();
        let features = board.features();
        // Give every instance of group 0 the same value at its current code.
        for index in 0..FEATURE_COUNT {
            if FEATURE_GROUP[index] == 0 {
                weights.set(0, 0, features[index] as usize, 1.0);
            }
        }
        let evaluator = Evaluator::new(Arc::new(weights));
        // Rows and columns 1 and 6 are empty at the start, so all four read code 0.
        assert_eq!(evaluator.pattern_sum(&board, 0), 4.0);
        assert_eq!(evaluator.pattern_sum(&board, 1), 0.0);

        let mut board = board;
        board.apply_legal(cell_index(3, 2), Player::Black);
        assert_eq!(
            evaluator.score(&board, Player::Black),
            4.0 + f64::from(board.mobility_score(Player::Black))
        );
    }
}
