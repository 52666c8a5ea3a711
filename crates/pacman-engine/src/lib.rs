//! Pure move semantics for the Pac-Man session engine.
//!
//! Every function here runs under the *shared* (read) mode of the
//! session RW lock (enforced by the caller, `pacman-session`); this
//! module only ever serializes concurrent callers through the per-cell
//! locks in [`pacman_common::Grid`]. Nothing here sleeps, spawns a
//! thread, or touches I/O.

use rand::Rng;

use pacman_common::{Cell, Content, Direction, Ghost, Grid, Player, ScriptedAction};

/// The result of a single move-engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Valid,
    Invalid,
    ReachedPortal,
    Dead,
}

/// Tick gate: decrement `wait_counter` and report whether this tick
/// should actually attempt an action.
///
/// Returns `true` when the caller should proceed to resolve and apply
/// a scripted action; `false` when the entity is still waiting out its
/// stride (the caller should treat this tick as `Valid` and leave the
/// script cursor untouched).
pub fn tick_gate(wait_counter: &mut u32, stride: u32) -> bool {
    if *wait_counter > 0 {
        *wait_counter -= 1;
        false
    } else {
        *wait_counter = stride;
        true
    }
}

/// Resolve a scripted action to a concrete step direction, if it names
/// one. `Random` draws uniformly from the four cardinal directions
/// using the caller-supplied RNG (per-session, per the open-question
/// decision in DESIGN.md -- never a shared global generator).
fn resolve_direction(action: ScriptedAction, rng: &mut impl Rng) -> Option<Direction> {
    match action {
        ScriptedAction::Step(dir) => Some(dir),
        ScriptedAction::Random => {
            let idx = rng.gen_range(0..Direction::ALL.len());
            Some(Direction::ALL[idx])
        }
        ScriptedAction::Charge | ScriptedAction::Dwell(_) | ScriptedAction::Quit => None,
    }
}

fn target_position(x: usize, y: usize, dir: Direction) -> (i32, i32) {
    let (dx, dy) = dir.delta();
    (x as i32 + dx, y as i32 + dy)
}

/// Advance the player by one scripted or interactive action.
///
/// `Dwell` and a bare tick-gate skip are handled by the caller
/// (`pacman-session`'s actor loop, via [`tick_gate`] and
/// `pacman_common::advance_cursor`); this function only ever sees an
/// action that should actually be attempted this tick.
pub fn step_player(grid: &Grid, player: &mut Player, action: ScriptedAction, rng: &mut impl Rng) -> MoveOutcome {
    let dir = match resolve_direction(action, rng) {
        Some(dir) => dir,
        None => return MoveOutcome::Valid, // Dwell: nothing to do this call
    };

    let (nx, ny) = target_position(player.x, player.y, dir);
    if !grid.in_bounds(nx, ny) {
        return MoveOutcome::Invalid;
    }
    let (nx, ny) = (nx as usize, ny as usize);
    let old_idx = grid.index(player.x, player.y);
    let new_idx = grid.index(nx, ny);

    grid.with_cells_locked(old_idx, new_idx, |pair| {
        let target = *pair.get(new_idx);

        if target.has_portal {
            pair.get_mut(old_idx).content = Content::Empty;
            pair.get_mut(new_idx).content = Content::Player;
            player.x = nx;
            player.y = ny;
            return MoveOutcome::ReachedPortal;
        }

        match target.content {
            Content::Wall => MoveOutcome::Invalid,
            Content::Ghost => {
                pair.get_mut(old_idx).content = Content::Empty;
                player.alive = false;
                MoveOutcome::Dead
            }
            Content::Empty | Content::Player => {
                if target.has_dot {
                    player.points += 1;
                    pair.get_mut(new_idx).has_dot = false;
                }
                pair.get_mut(old_idx).content = Content::Empty;
                pair.get_mut(new_idx).content = Content::Player;
                player.x = nx;
                player.y = ny;
                MoveOutcome::Valid
            }
        }
    })
}

/// Advance a ghost by one scripted action.
pub fn step_ghost(grid: &Grid, ghost: &mut Ghost, players: &mut [Player], action: ScriptedAction, rng: &mut impl Rng) -> MoveOutcome {
    if let ScriptedAction::Charge = action {
        ghost.charged = true;
        return MoveOutcome::Valid;
    }

    let dir = match resolve_direction(action, rng) {
        Some(dir) => dir,
        None => return MoveOutcome::Valid, // Dwell, or an action ghosts can't perform (Quit)
    };

    if ghost.charged {
        ghost.charged = false;
        charged_sweep(grid, ghost, players, dir)
    } else {
        step_ghost_plain(grid, ghost, players, dir)
    }
}

fn step_ghost_plain(grid: &Grid, ghost: &mut Ghost, players: &mut [Player], dir: Direction) -> MoveOutcome {
    let (nx, ny) = target_position(ghost.x, ghost.y, dir);
    if !grid.in_bounds(nx, ny) {
        return MoveOutcome::Invalid;
    }
    let (nx, ny) = (nx as usize, ny as usize);
    let old_idx = grid.index(ghost.x, ghost.y);
    let new_idx = grid.index(nx, ny);

    grid.with_cells_locked(old_idx, new_idx, |pair| {
        let target = *pair.get(new_idx);

        match target.content {
            Content::Wall | Content::Ghost => MoveOutcome::Invalid,
            Content::Player => {
                let outcome = kill_player_at(players, nx, ny);
                pair.get_mut(old_idx).content = Content::Empty;
                ghost.x = nx;
                ghost.y = ny;
                pair.get_mut(new_idx).content = Content::Ghost;
                outcome
            }
            Content::Empty => {
                pair.get_mut(old_idx).content = Content::Empty;
                ghost.x = nx;
                ghost.y = ny;
                pair.get_mut(new_idx).content = Content::Ghost;
                MoveOutcome::Valid
            }
        }
    })
}

/// Slide a charged ghost from its current cell toward the grid
/// boundary along `dir`, locking the whole scanned strip up front so
/// the chosen target cannot be invalidated by a concurrent mover
/// entering the strip mid-sweep.
fn charged_sweep(grid: &Grid, ghost: &mut Ghost, players: &mut [Player], dir: Direction) -> MoveOutcome {
    let axis_len = match dir {
        Direction::Up | Direction::Down => grid.height(),
        Direction::Left | Direction::Right => grid.width(),
    };
    let axis_pos = match dir {
        Direction::Up | Direction::Down => ghost.y,
        Direction::Left | Direction::Right => ghost.x,
    };

    let at_boundary = if dir.sweeps_ascending() {
        axis_pos + 1 >= axis_len
    } else {
        axis_pos == 0
    };
    if at_boundary {
        return MoveOutcome::Invalid;
    }

    // `scan_order` walks nearest-to-farthest from the ghost, which is
    // what the blocked-by/target-selection logic below needs. The
    // locks themselves must still be taken in ascending grid-index
    // order regardless of sweep direction -- `Grid::with_strip_locked`
    // requires it, and it's the deadlock-freedom argument for every
    // multi-cell acquisition in this engine -- so `lock_order` is a
    // separately sorted copy used only for the locking call.
    let scan_order: Vec<usize> = if dir.sweeps_ascending() {
        (axis_pos..axis_len)
            .map(|p| strip_index(grid, ghost, dir, p))
            .collect()
    } else {
        (0..=axis_pos)
            .rev()
            .map(|p| strip_index(grid, ghost, dir, p))
            .collect()
    };
    let mut lock_order = scan_order.clone();
    lock_order.sort_unstable();

    grid.with_strip_locked(&lock_order, |strip| {
        let ghost_idx = strip_index(grid, ghost, dir, axis_pos);

        let mut target_idx = *scan_order.last().unwrap(); // boundary if nothing blocks
        let mut outcome = MoveOutcome::Valid;
        let mut killed = false;

        for (offset, &idx) in scan_order.iter().enumerate().skip(1) {
            let cell: Cell = *strip.get(idx);
            match cell.content {
                Content::Wall | Content::Ghost => {
                    target_idx = scan_order[offset - 1];
                    break;
                }
                Content::Player => {
                    target_idx = idx;
                    outcome = MoveOutcome::Dead;
                    killed = true;
                    break;
                }
                Content::Empty => continue,
            }
        }

        if killed {
            let (tx, ty) = position_of(grid, target_idx);
            outcome = kill_player_at(players, tx, ty).max_dead(outcome);
        }

        strip.get_mut(ghost_idx).content = Content::Empty;
        let (tx, ty) = position_of(grid, target_idx);
        ghost.x = tx;
        ghost.y = ty;
        strip.get_mut(target_idx).content = Content::Ghost;

        outcome
    })
}

fn strip_index(grid: &Grid, ghost: &Ghost, dir: Direction, axis_pos: usize) -> usize {
    match dir {
        Direction::Up | Direction::Down => grid.index(ghost.x, axis_pos),
        Direction::Left | Direction::Right => grid.index(axis_pos, ghost.y),
    }
}

fn position_of(grid: &Grid, idx: usize) -> (usize, usize) {
    (idx % grid.width(), idx / grid.width())
}

impl MoveOutcome {
    /// `Dead` dominates `Valid`/`Invalid` when combining an
    /// already-computed sweep outcome with a kill resolution.
    fn max_dead(self, other: MoveOutcome) -> MoveOutcome {
        if self == MoveOutcome::Dead || other == MoveOutcome::Dead {
            MoveOutcome::Dead
        } else {
            other
        }
    }
}

/// Find the first alive player occupying `(x, y)`, mark them dead, and
/// report the kill. Used by both the plain ghost move and the charged
/// sweep -- both locate their victim by position, not by a precomputed
/// index, since the move engine is generalized over `n` players even
/// though this game always runs exactly one.
fn kill_player_at(players: &mut [Player], x: usize, y: usize) -> MoveOutcome {
    for player in players.iter_mut() {
        if player.alive && player.x == x && player.y == y {
            player.alive = false;
            return MoveOutcome::Dead;
        }
    }
    MoveOutcome::Valid
}
