use std::fs;
use std::path::Path;

use pacman_common::{Direction, ScriptedAction};

use crate::{is_comment_or_blank, LevelError};

/// The parsed contents of a `*.pac` or `*.mon` entity file: how often it
/// moves, where it starts (if the file says), and its action sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScript {
    pub stride: u32,
    pub position: Option<(usize, usize)>,
    pub actions: Vec<ScriptedAction>,
}

/// Parse a Pac-Man entity file. `Q` (quit) is recognized; `C` (charge)
/// is not -- charging is a ghost-only action.
pub fn parse_player_script(path: &Path) -> Result<ParsedScript, LevelError> {
    parse_script_file(path, true, false)
}

/// Parse a ghost entity file. `C` (charge) is recognized; `Q` (quit) is
/// not -- quitting is a player-only action.
pub fn parse_ghost_script(path: &Path) -> Result<ParsedScript, LevelError> {
    parse_script_file(path, false, true)
}

fn parse_script_file(path: &Path, allow_quit: bool, allow_charge: bool) -> Result<ParsedScript, LevelError> {
    let contents = fs::read_to_string(path)?;
    let lines: Vec<&str> = contents.lines().collect();

    let mut stride: u32 = 0;
    let mut position: Option<(usize, usize)> = None;
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
            "PASSO" => {
                if let Some(arg) = words.next() {
                    if let Ok(n) = arg.parse::<u32>() {
                        stride = n;
                    }
                }
                i += 1;
            }
            "POS" => {
                if let (Some(x_arg), Some(y_arg)) = (words.next(), words.next()) {
                    if let (Ok(x), Ok(y)) = (x_arg.parse::<usize>(), y_arg.parse::<usize>()) {
                        position = Some((x, y));
                    }
                }
                i += 1;
            }
            _ => break,
        }
    }

    let mut actions = Vec::new();
    while i < lines.len() {
        let line = lines[i];
        i += 1;
        if is_comment_or_blank(line) {
            continue;
        }
        match parse_action_line(line, allow_quit, allow_charge) {
            Some(action) => actions.push(action),
            None => {
                // Includes `G` (quicksave, no scripted counterpart) and
                // any misplaced keyword -- skip the line rather than
                // stall the whole script on one bad token.
                tracing::warn!(path = %path.display(), line = %line, "unrecognized action line, skipping");
            }
        }
    }

    Ok(ParsedScript { stride, position, actions })
}

fn parse_action_line(line: &str, allow_quit: bool, allow_charge: bool) -> Option<ScriptedAction> {
    let bytes = line.as_bytes();
    match bytes.first()? {
        b'W' => Some(ScriptedAction::Step(Direction::Up)),
        b'S' => Some(ScriptedAction::Step(Direction::Down)),
        b'A' => Some(ScriptedAction::Step(Direction::Left)),
        b'D' => Some(ScriptedAction::Step(Direction::Right)),
        b'R' => Some(ScriptedAction::Random),
        b'C' if allow_charge => Some(ScriptedAction::Charge),
        b'Q' if allow_quit => Some(ScriptedAction::Quit),
        b'T' if bytes.get(1) == Some(&b' ') => {
            let n: u32 = line[2..].trim().parse().ok()?;
            if n > 0 {
                Some(ScriptedAction::Dwell(n))
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_tmp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "pacman-level-script-test-{:?}-{name}",
            std::thread::current().id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn ghost_script_parses_directives_and_moves() {
        let path = write_tmp("ghost.mon", "PASSO 2\nPOS 3 4\nW\nR\nC\nT 5\n");
        let parsed = parse_ghost_script(&path).unwrap();
        assert_eq!(parsed.stride, 2);
        assert_eq!(parsed.position, Some((3, 4)));
        assert_eq!(
            parsed.actions,
            vec![
                ScriptedAction::Step(Direction::Up),
                ScriptedAction::Random,
                ScriptedAction::Charge,
                ScriptedAction::Dwell(5),
            ]
        );
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn player_script_allows_quit_not_charge() {
        let path = write_tmp("player.pac", "PASSO 0\nQ\nC\nW\n");
        let parsed = parse_player_script(&path).unwrap();
        // `C` has no counterpart for a player and is dropped.
        assert_eq!(parsed.actions, vec![ScriptedAction::Quit, ScriptedAction::Step(Direction::Up)]);
    }

    #[test]
    fn missing_directives_default_to_stride_zero_and_no_position() {
        let path = write_tmp("no-directives.mon", "W\nS\n");
        let parsed = parse_ghost_script(&path).unwrap();
        assert_eq!(parsed.stride, 0);
        assert_eq!(parsed.position, None);
    }

    #[test]
    fn zero_turn_dwell_is_dropped() {
        let path = write_tmp("zero-dwell.mon", "T 0\nW\n");
        let parsed = parse_ghost_script(&path).unwrap();
        assert_eq!(parsed.actions, vec![ScriptedAction::Step(Direction::Up)]);
    }
}
