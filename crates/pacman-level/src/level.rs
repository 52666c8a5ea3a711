use std::fs;
use std::path::{Path, PathBuf};

use pacman_common::{Cell, Content, Ghost, Grid, Player};

use crate::script::{parse_ghost_script, parse_player_script};
use crate::{is_comment_or_blank, LevelError};

/// Tick duration used when a level file carries no `TEMPO` directive.
/// A zero or missing cadence would busy-loop every actor at
/// effectively no delay; a level missing `TEMPO` is almost certainly
/// a fixture error, so this falls back to a cadence slow enough to be
/// observable.
pub const DEFAULT_TEMPO_MS: u32 = 200;

/// A level file's directives and grid, before entity scripts are
/// resolved and the grid is handed to the move engine.
#[derive(Debug, Clone)]
pub struct ParsedLevel {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub tempo: u32,
    pub cells: Vec<Cell>,
    pub player_script_path: Option<PathBuf>,
    pub ghost_script_paths: Vec<PathBuf>,
}

/// A fully resolved level, ready to hand to a session: grid built,
/// entity files parsed, player and ghosts placed and stamped onto the
/// grid.
pub struct LoadedLevel {
    pub name: String,
    pub tempo: u32,
    pub grid: Grid,
    pub player: Player,
    pub ghosts: Vec<Ghost>,
}

/// Parse a `*.lvl` file: the `DIM`/`TEMPO`/`PAC`/`MON` directive block,
/// then the grid rows. The directive loop stops at the first line that
/// isn't a recognized keyword -- that line is the first grid row, not
/// consumed twice, not skipped.
pub fn parse_level_file(path: &Path) -> Result<ParsedLevel, LevelError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let contents = fs::read_to_string(path)?;
    let lines: Vec<&str> = contents.lines().collect();

    let mut width = 0usize;
    let mut height = 0usize;
    let mut tempo: Option<u32> = None;
    let mut player_script_path = None;
    let mut ghost_script_paths = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if is_comment_or_blank(line) {
            i += 1;
            continue;
        }
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            i += 1;
            continue;
        };
        match keyword {
            "DIM" => {
                if let (Some(w), Some(h)) = (words.next(), words.next()) {
                    if let (Ok(w), Ok(h)) = (w.parse(), h.parse()) {
                        width = w;
                        height = h;
                    }
                }
                i += 1;
            }
            "TEMPO" => {
                if let Some(t) = words.next() {
                    if let Ok(t) = t.parse() {
                        tempo = Some(t);
                    }
                }
                i += 1;
            }
            "PAC" => {
                if let Some(f) = words.next() {
                    player_script_path = Some(dir.join(f));
                }
                i += 1;
            }
            "MON" => {
                for f in words {
                    ghost_script_paths.push(dir.join(f));
                }
                i += 1;
            }
            _ => break,
        }
    }

    if width == 0 || height == 0 {
        return Err(LevelError::MissingDimensions);
    }

    let tempo = tempo.unwrap_or_else(|| {
        tracing::warn!(level = %name, fallback_ms = DEFAULT_TEMPO_MS, "level file has no TEMPO directive, using fallback cadence");
        DEFAULT_TEMPO_MS
    });

    let mut cells = vec![Cell::empty(); width * height];
    let mut row = 0usize;
    while row < height {
        while i < lines.len() && is_comment_or_blank(lines[i]) {
            i += 1;
        }
        if i >= lines.len() {
            return Err(LevelError::MissingRows { expected: height, found: row });
        }
        let line = lines[i];
        i += 1;

        let chars: Vec<char> = line.chars().collect();
        if chars.len() < width {
            return Err(LevelError::ShortRow { row, expected: width, found: chars.len() });
        }
        for col in 0..width {
            let idx = row * width + col;
            cells[idx] = match chars[col] {
                'X' => Cell::wall(),
                '@' => Cell::portal(),
                _ => Cell::dotted(),
            };
        }
        row += 1;
    }

    Ok(ParsedLevel {
        name,
        width,
        height,
        tempo,
        cells,
        player_script_path,
        ghost_script_paths,
    })
}

/// Find the row-major-first non-wall cell. Used to park an interactive
/// player that has no `PAC` file.
fn first_free_cell(width: usize, height: usize, cells: &[Cell]) -> Option<(usize, usize)> {
    for y in 0..height {
        for x in 0..width {
            if cells[y * width + x].content != Content::Wall {
                return Some((x, y));
            }
        }
    }
    None
}

/// Parse a level file and its entity scripts, and produce a ready-to-run
/// grid, player, and ghost set. `carried_points` lets a session roll a
/// player's score from the previous level into this one.
pub fn load_level(path: &Path, carried_points: u32) -> Result<LoadedLevel, LevelError> {
    let parsed = parse_level_file(path)?;
    let mut cells = parsed.cells;

    let (player_x, player_y, player_script) = match &parsed.player_script_path {
        Some(script_path) => {
            let script = parse_player_script(script_path)?;
            let pos = match script.position {
                Some(pos) => pos,
                None => first_free_cell(parsed.width, parsed.height, &cells)
                    .ok_or(LevelError::NoFreeCellForPlayer)?,
            };
            (pos.0, pos.1, script)
        }
        None => {
            let pos = first_free_cell(parsed.width, parsed.height, &cells).ok_or(LevelError::NoFreeCellForPlayer)?;
            (pos.0, pos.1, crate::script::ParsedScript { stride: 0, position: Some(pos), actions: Vec::new() })
        }
    };
    if player_x >= parsed.width || player_y >= parsed.height {
        return Err(LevelError::PositionOutOfBounds { x: player_x, y: player_y });
    }
    cells[player_y * parsed.width + player_x].content = Content::Player;

    let player = if player_script.actions.is_empty() {
        Player::new_interactive(player_x, player_y, carried_points)
    } else {
        Player::new_scripted(player_x, player_y, carried_points, player_script.stride, player_script.actions)
    };

    let mut ghosts = Vec::with_capacity(parsed.ghost_script_paths.len());
    for ghost_path in &parsed.ghost_script_paths {
        let script = parse_ghost_script(ghost_path)?;
        let (x, y) = script.position.ok_or_else(|| LevelError::MissingGhostPosition {
            path: ghost_path.display().to_string(),
        })?;
        if x >= parsed.width || y >= parsed.height {
            return Err(LevelError::PositionOutOfBounds { x, y });
        }
        if script.actions.is_empty() {
            return Err(LevelError::EmptyGhostScript { path: ghost_path.display().to_string() });
        }
        cells[y * parsed.width + x].content = Content::Ghost;
        ghosts.push(Ghost::new(x, y, script.stride, script.actions));
    }

    let grid = Grid::from_cells(parsed.width, parsed.height, cells);

    Ok(LoadedLevel {
        name: parsed.name,
        tempo: parsed.tempo,
        grid,
        player,
        ghosts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_level(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("pacman-level-test-{:?}", std::thread::current().id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_dimensions_tempo_and_grid_alphabet() {
        let path = write_level(
            "basic.lvl",
            "DIM 3 2\nTEMPO 250\nXXX\nX@.\n",
        );
        let parsed = parse_level_file(&path).unwrap();
        assert_eq!(parsed.width, 3);
        assert_eq!(parsed.height, 2);
        assert_eq!(parsed.tempo, 250);
        assert_eq!(parsed.cells[0].content, Content::Wall);
        assert_eq!(parsed.cells[3].content, Content::Wall); // row 1, col 0
        assert!(parsed.cells[4].has_portal); // row 1, col 1 ('@')
        assert!(parsed.cells[5].has_dot); // row 1, col 2 ('.')
    }

    #[test]
    fn missing_dimensions_is_an_error() {
        let path = write_level("nodim.lvl", "TEMPO 100\n...\n");
        assert!(matches!(parse_level_file(&path), Err(LevelError::MissingDimensions)));
    }

    #[test]
    fn load_level_defaults_interactive_player_to_first_free_cell() {
        let path = write_level("noplayer.lvl", "DIM 3 1\nTEMPO 100\nX..\n");
        let loaded = load_level(&path, 0).unwrap();
        assert!(loaded.player.is_interactive());
        assert_eq!((loaded.player.x, loaded.player.y), (1, 0));
        assert_eq!(loaded.grid.snapshot(1).content, Content::Player);
    }

    #[test]
    fn load_level_carries_points_forward() {
        let path = write_level("carry.lvl", "DIM 2 1\nTEMPO 100\n..\n");
        let loaded = load_level(&path, 17).unwrap();
        assert_eq!(loaded.player.points, 17);
    }

    #[test]
    fn ghost_without_position_is_rejected() {
        let dir = std::env::temp_dir().join(format!("pacman-level-test-ghost-{:?}", std::thread::current().id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("nopos.mon"), "PASSO 1\nW\n").unwrap();
        fs::write(dir.join("level.lvl"), "DIM 2 1\nTEMPO 100\nMON nopos.mon\n..\n").unwrap();

        let err = load_level(&dir.join("level.lvl"), 0).unwrap_err();
        assert!(matches!(err, LevelError::MissingGhostPosition { .. }));
    }
}
