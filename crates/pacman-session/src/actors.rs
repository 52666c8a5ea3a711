use std::io::{Read, Write};
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use pacman_common::{advance_cursor, Key, ScriptedAction};
use pacman_engine::{step_ghost, step_player, tick_gate, MoveOutcome};
use pacman_proto::{write_board_snapshot, BoardHeader, ProtoError, RequestMessage};

use crate::runtime::{ConnectionState, LevelOutcome, LevelRuntime};

/// Map an interactive wire command to the scripted action the engine
/// understands. `Charge` and `QuickSave` have no meaning for a live
/// player -- charging is ghost-only, quicksave is out of scope -- so
/// they fall through to a no-op tick rather than an engine call.
fn key_to_player_action(key: Key) -> Option<ScriptedAction> {
    match key {
        Key::Step(dir) => Some(ScriptedAction::Step(dir)),
        Key::Random => Some(ScriptedAction::Random),
        Key::Quit => Some(ScriptedAction::Quit),
        Key::Charge | Key::QuickSave => None,
    }
}

/// Drive the player for one level: one tick every `tempo * (1 + stride)`
/// ms, on top of which [`tick_gate`] still skips ticks between real
/// actions -- the sleep itself lengthens with stride, it isn't the only
/// thing gating how often the player acts.
///
/// Returns the outcome that decides what the session manager does
/// next: advance to the next level, or end the game for this player.
pub fn player_driver(conn: &ConnectionState, level: &LevelRuntime) -> LevelOutcome {
    let stride = level.board.player.lock().stride;
    let tick_period = Duration::from_millis(level.board.tempo as u64 * (1 + stride as u64));

    loop {
        if !conn.client_connected.load(Ordering::Acquire) {
            return LevelOutcome::Quit;
        }
        thread::sleep(tick_period);

        let guard = level.barrier.read();
        if level.shutdown.load(Ordering::Acquire) {
            return LevelOutcome::Quit;
        }

        let action = {
            let mut player = level.board.player.lock();
            if !player.alive {
                return LevelOutcome::Quit;
            }
            let stride = player.stride;
            if !tick_gate(&mut player.wait_counter, stride) {
                None
            } else if player.is_interactive() {
                conn.command_slot.take().and_then(key_to_player_action)
            } else {
                let (action, cursor, dwell) =
                    advance_cursor(&player.script, player.move_cursor, player.dwell_remaining);
                player.move_cursor = cursor;
                player.dwell_remaining = dwell;
                Some(action)
            }
        };

        let action = match action {
            Some(ScriptedAction::Quit) => return LevelOutcome::Quit,
            Some(action) => action,
            None => {
                drop(guard);
                continue;
            }
        };

        let outcome = {
            let mut rng = level.rng.lock();
            let mut player = level.board.player.lock();
            step_player(&level.board.grid, &mut player, action, &mut *rng)
        };
        drop(guard);

        match outcome {
            MoveOutcome::ReachedPortal => return LevelOutcome::NextLevel,
            MoveOutcome::Dead => return LevelOutcome::Quit,
            MoveOutcome::Valid | MoveOutcome::Invalid => {}
        }
    }
}

/// Drive a single ghost for the lifetime of a level, one tick every
/// `tempo * (1 + stride)` ms (see [`player_driver`]). Ghosts have no
/// interactive fallback and no way to end the game themselves -- the
/// loop only ever stops when the teardown barrier sets `shutdown`.
pub fn ghost_driver(level: &LevelRuntime, ghost_index: usize) {
    let stride = level.board.ghosts[ghost_index].lock().stride;
    let tick_period = Duration::from_millis(level.board.tempo as u64 * (1 + stride as u64));

    loop {
        thread::sleep(tick_period);

        let guard = level.barrier.read();
        if level.shutdown.load(Ordering::Acquire) {
            return;
        }

        let action = {
            let mut ghost = level.board.ghosts[ghost_index].lock();
            let stride = ghost.stride;
            if !tick_gate(&mut ghost.wait_counter, stride) {
                None
            } else {
                let (action, cursor, dwell) = advance_cursor(&ghost.script, ghost.move_cursor, ghost.dwell_remaining);
                ghost.move_cursor = cursor;
                ghost.dwell_remaining = dwell;
                Some(action)
            }
        };

        if let Some(action) = action {
            let mut rng = level.rng.lock();
            let mut ghost = level.board.ghosts[ghost_index].lock();
            let mut player = level.board.player.lock();
            step_ghost(&level.board.grid, &mut ghost, std::slice::from_mut(&mut player), action, &mut *rng);
        }

        drop(guard);
    }
}

/// Send a board snapshot every `tempo` ms until shutdown or
/// disconnection. A write failure is treated the same as an explicit
/// disconnect: the client pipe is gone either way.
pub fn notifier(conn: &ConnectionState, level: &LevelRuntime, writer: &mut impl Write) {
    let tick_period = Duration::from_millis(level.board.tempo as u64);

    loop {
        thread::sleep(tick_period);

        let guard = level.barrier.read();
        if level.shutdown.load(Ordering::Acquire) || !conn.client_connected.load(Ordering::Acquire) {
            return;
        }

        let cells = level.board.snapshot_cells();
        let header = BoardHeader {
            width: level.board.grid.width() as i32,
            height: level.board.grid.height() as i32,
            tempo: level.board.tempo as i32,
            victory: 0,
            game_over: 0,
            accumulated_points: level.board.accumulated_points() as i32,
        };

        if write_board_snapshot(writer, &header, &cells).is_err() {
            conn.client_connected.store(false, Ordering::Release);
            return;
        }
    }
}

/// Write the final `game_over` notification. Called once, after the
/// level loop has no more levels to offer or the player quit.
pub fn send_game_over(conn: &ConnectionState, writer: &mut impl Write) {
    if !conn.client_connected.load(Ordering::Acquire) {
        return;
    }
    let header = BoardHeader { game_over: 1, ..BoardHeader::default() };
    let _ = header.write_to(writer);
}

/// Read `PLAY`/`DISCONNECT` records off the request pipe for the whole
/// session, independent of level boundaries. A malformed or unknown
/// op code is dropped and reading continues -- only a genuine read
/// failure or an explicit `DISCONNECT` ends the session.
pub fn input_reader(conn: &ConnectionState, reader: &mut impl Read) {
    loop {
        match RequestMessage::read_from(reader) {
            Ok(RequestMessage::Play(byte)) => {
                if let Some(key) = Key::from_wire_byte(byte) {
                    conn.command_slot.set(key);
                }
            }
            Ok(RequestMessage::Disconnect) => {
                conn.client_connected.store(false, Ordering::Release);
                return;
            }
            Err(ProtoError::UnknownOpCode(_)) => continue,
            Err(_) => {
                conn.client_connected.store(false, Ordering::Release);
                return;
            }
        }
    }
}
