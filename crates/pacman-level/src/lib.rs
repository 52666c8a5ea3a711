//! Parsers for the two on-disk grammars a level directory holds: the
//! `*.lvl` level file (board dimensions, tempo, grid, entity file
//! references) and the `*.pac` / `*.mon` entity script files (starting
//! position and a sequence of scripted actions).
//!
//! The directive loop falls through into the grid on the first
//! unrecognized keyword, the grid alphabet defaults to a dot, and
//! Pac-Man (optional script, falls back to an interactive player
//! parked on the first free cell) and ghosts (script mandatory, no
//! default spawn) are deliberately asymmetric.

mod discover;
mod level;
mod script;

pub use discover::discover_levels;
pub use level::{load_level, parse_level_file, LoadedLevel, ParsedLevel};
pub use script::{parse_ghost_script, parse_player_script, ParsedScript};

use std::fmt;
use std::io;

/// Everything that can go wrong turning a file on disk into board
/// state. The session loader's policy for all of these is log-and-skip
/// the level, not crash the server.
#[derive(Debug)]
pub enum LevelError {
    Io(io::Error),
    MissingDimensions,
    ShortRow { row: usize, expected: usize, found: usize },
    MissingRows { expected: usize, found: usize },
    MissingGhostPosition { path: String },
    EmptyGhostScript { path: String },
    PositionOutOfBounds { x: usize, y: usize },
    NoFreeCellForPlayer,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io(e) => write!(f, "i/o error: {e}"),
            LevelError::MissingDimensions => write!(f, "level file has no DIM directive"),
            LevelError::ShortRow { row, expected, found } => {
                write!(f, "row {row} has {found} columns, expected {expected}")
            }
            LevelError::MissingRows { expected, found } => {
                write!(f, "grid has {found} rows, expected {expected}")
            }
            LevelError::MissingGhostPosition { path } => {
                write!(f, "ghost script {path} has no POS directive")
            }
            LevelError::EmptyGhostScript { path } => {
                write!(f, "ghost script {path} has no recognized moves")
            }
            LevelError::PositionOutOfBounds { x, y } => write!(f, "position ({x}, {y}) is outside the grid"),
            LevelError::NoFreeCellForPlayer => write!(f, "no non-wall cell left to park the default player"),
        }
    }
}

impl std::error::Error for LevelError {}

impl From<io::Error> for LevelError {
    fn from(e: io::Error) -> Self {
        LevelError::Io(e)
    }
}

/// Lines starting with `#`, and blank lines, carry no directive or grid
/// content anywhere in either grammar.
pub(crate) fn is_comment_or_blank(line: &str) -> bool {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    trimmed.is_empty() || trimmed.starts_with('#')
}
