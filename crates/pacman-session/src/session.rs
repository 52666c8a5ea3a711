use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use pacman_proto::{write_board_snapshot, BoardHeader};

use crate::actors::{ghost_driver, input_reader, notifier, player_driver, send_game_over};
use crate::board::SessionBoard;
use crate::runtime::{ActorGroup, ConnectionState, LevelOutcome, LevelRuntime};

/// Run every actor for one level and report how it ended.
///
/// Spawns a ghost driver per ghost and one notifier, all borrowing the
/// level's state for the scope of this call -- no `Arc` needed, since
/// [`std::thread::scope`] guarantees every spawned thread is joined
/// before the borrow ends. The player driver runs on the calling
/// thread rather than its own, since nothing else needs to wait on it
/// concurrently with the caller.
///
/// Once the player driver returns, this takes the barrier's exclusive
/// mode to set `shutdown` -- which cannot succeed until every actor
/// currently mid-tick has released its shared guard -- before joining
/// the rest. This is the "teardown barrier" the RW lock exists for.
pub fn run_level(conn: &ConnectionState, board: SessionBoard, notif_writer: &mut (impl Write + Send)) -> (LevelOutcome, SessionBoard) {
    let level = LevelRuntime::new(board);
    let ghost_count = level.board.ghosts.len();

    let outcome = thread::scope(|scope| {
        let mut group = ActorGroup::new();
        for ghost_index in 0..ghost_count {
            let level_ref = &level;
            group.spawn(scope.spawn(move || ghost_driver(level_ref, ghost_index)));
        }
        let level_ref = &level;
        group.spawn(scope.spawn(move || notifier(conn, level_ref, notif_writer)));

        let outcome = player_driver(conn, &level);

        {
            let _exclusive = level.barrier.write();
            level.shutdown.store(true, Ordering::Release);
        }

        group.join_all();
        outcome
    });

    (outcome, level.board)
}

/// Run a whole session: connect the request pipe to the command slot
/// for the session's lifetime, then walk the level directory in order,
/// loading, running, and retiring one level at a time until the player
/// quits, dies, disconnects, or the levels run out.
///
/// The input thread outlives every individual level's actor set,
/// levels advance strictly in directory order, points carry forward
/// between levels, and a final `game_over` notification closes out
/// the session.
pub fn run_session(levels_dir: &Path, req_reader: &mut (impl Read + Send), notif_writer: &mut (impl Write + Send)) {
    let conn = ConnectionState::new();

    thread::scope(|scope| {
        let conn_ref = &conn;
        scope.spawn(move || input_reader(conn_ref, req_reader));

        let levels = match pacman_level::discover_levels(levels_dir) {
            Ok(levels) => levels,
            Err(err) => {
                tracing::warn!(dir = %levels_dir.display(), error = %err, "could not read levels directory");
                Vec::new()
            }
        };

        let mut accumulated_points: u32 = 0;

        for level_path in levels {
            if !conn.client_connected.load(Ordering::Acquire) {
                break;
            }

            let loaded = match pacman_level::load_level(&level_path, accumulated_points) {
                Ok(loaded) => loaded,
                Err(err) => {
                    tracing::warn!(level = %level_path.display(), error = %err, "skipping malformed level");
                    continue;
                }
            };
            tracing::info!(level = %level_path.display(), "loading level");

            let board = SessionBoard::from_loaded(loaded);
            let (outcome, board) = run_level(&conn, board, notif_writer);
            accumulated_points = board.accumulated_points();

            match outcome {
                LevelOutcome::NextLevel => {
                    if conn.client_connected.load(Ordering::Acquire) {
                        let header = BoardHeader {
                            width: board.grid.width() as i32,
                            height: board.grid.height() as i32,
                            tempo: board.tempo as i32,
                            victory: 0,
                            game_over: 0,
                            accumulated_points: accumulated_points as i32,
                        };
                        let _ = write_board_snapshot(notif_writer, &header, &board.snapshot_cells());
                        thread::sleep(Duration::from_millis(board.tempo as u64));
                    }
                }
                LevelOutcome::Quit => break,
            }
        }

        send_game_over(&conn, notif_writer);
        conn.client_connected.store(false, Ordering::Release);
    });
}
