use crate::direction::Direction;

/// A single scripted action, lifted from its source character at parse
/// time (per the "dynamic string-parsed commands" design note) so the
/// move engine's hot path switches on a tag, never on a `char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedAction {
    Step(Direction),
    Random,
    /// Arm a charged sweep (ghosts only).
    Charge,
    /// Dwell for `n` ticks before advancing the cursor.
    Dwell(u32),
    /// Quit (player only).
    Quit,
}

/// The player entity.
#[derive(Debug, Clone)]
pub struct Player {
    pub x: usize,
    pub y: usize,
    pub alive: bool,
    pub points: u32,
    pub stride: u32,
    pub wait_counter: u32,
    pub script: Vec<ScriptedAction>,
    pub move_cursor: usize,
    /// Ticks remaining in an in-progress `Dwell`; `0` when not dwelling.
    pub dwell_remaining: u32,
}

impl Player {
    pub fn new_interactive(x: usize, y: usize, points: u32) -> Player {
        Player {
            x,
            y,
            alive: true,
            points,
            stride: 0,
            wait_counter: 0,
            script: Vec::new(),
            move_cursor: 0,
            dwell_remaining: 0,
        }
    }

    pub fn new_scripted(x: usize, y: usize, points: u32, stride: u32, script: Vec<ScriptedAction>) -> Player {
        Player {
            x,
            y,
            alive: true,
            points,
            stride,
            wait_counter: stride,
            script,
            move_cursor: 0,
            dwell_remaining: 0,
        }
    }

    /// A player with an empty script reads from the command slot.
    pub fn is_interactive(&self) -> bool {
        self.script.is_empty()
    }
}

/// The ghost entity. Like [`Player`] minus points, plus `charged`.
#[derive(Debug, Clone)]
pub struct Ghost {
    pub x: usize,
    pub y: usize,
    pub alive: bool,
    pub stride: u32,
    pub wait_counter: u32,
    pub script: Vec<ScriptedAction>,
    pub move_cursor: usize,
    pub dwell_remaining: u32,
    pub charged: bool,
}

impl Ghost {
    pub fn new(x: usize, y: usize, stride: u32, script: Vec<ScriptedAction>) -> Ghost {
        assert!(!script.is_empty(), "ghosts have no interactive fallback and require a script");
        Ghost {
            x,
            y,
            alive: true,
            stride,
            wait_counter: stride,
            script,
            move_cursor: 0,
            dwell_remaining: 0,
            charged: false,
        }
    }
}

/// Advance through a scripted action sequence, handling `Dwell` by
/// decrementing `dwell_remaining` in place and only moving the cursor
/// forward once the dwell completes.
///
/// Returns the action to execute on this tick, and the (possibly
/// unchanged) `(cursor, dwell_remaining)` pair to store back.
pub fn advance_cursor(script: &[ScriptedAction], cursor: usize, dwell_remaining: u32) -> (ScriptedAction, usize, u32) {
    assert!(!script.is_empty(), "advance_cursor requires a non-empty script");
    let action = script[cursor % script.len()];
    match action {
        ScriptedAction::Dwell(n) => {
            if dwell_remaining == 0 {
                // First tick of this dwell: if n == 0 the dwell is a
                // no-op, advance immediately; otherwise start counting.
                if n == 0 {
                    (action, (cursor + 1) % script.len(), 0)
                } else {
                    (action, cursor, n - 1)
                }
            } else if dwell_remaining == 1 {
                (action, (cursor + 1) % script.len(), 0)
            } else {
                (action, cursor, dwell_remaining - 1)
            }
        }
        _ => (action, (cursor + 1) % script.len(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_cursor_steps_wrap_modulo_script_length() {
        let script = vec![
            ScriptedAction::Step(Direction::Up),
            ScriptedAction::Step(Direction::Down),
        ];
        let (a0, c0, _) = advance_cursor(&script, 0, 0);
        assert_eq!(a0, ScriptedAction::Step(Direction::Up));
        assert_eq!(c0, 1);
        let (a1, c1, _) = advance_cursor(&script, c0, 0);
        assert_eq!(a1, ScriptedAction::Step(Direction::Down));
        assert_eq!(c1, 0);
    }

    #[test]
    fn advance_cursor_dwell_holds_cursor_until_final_tick() {
        let script = vec![ScriptedAction::Dwell(2), ScriptedAction::Step(Direction::Right)];
        let (a0, c0, d0) = advance_cursor(&script, 0, 0);
        assert_eq!(a0, ScriptedAction::Dwell(2));
        assert_eq!(c0, 0, "cursor must not advance mid-dwell");
        assert_eq!(d0, 1);

        let (a1, c1, d1) = advance_cursor(&script, c0, d0);
        assert_eq!(a1, ScriptedAction::Dwell(2));
        assert_eq!(c1, 1, "cursor advances on the final dwell tick");
        assert_eq!(d1, 0);
    }

    #[test]
    fn advance_cursor_zero_length_dwell_is_a_noop() {
        let script = vec![ScriptedAction::Dwell(0), ScriptedAction::Step(Direction::Left)];
        let (_, cursor, dwell) = advance_cursor(&script, 0, 0);
        assert_eq!(cursor, 1);
        assert_eq!(dwell, 0);
    }
}
