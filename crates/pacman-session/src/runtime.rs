use std::sync::atomic::AtomicBool;
use std::thread::ScopedJoinHandle;

use parking_lot::{Mutex, RwLock};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::board::SessionBoard;
use crate::command_slot::CommandSlot;

/// State that outlives any single level: the request pipe's command
/// slot and the connected/disconnected flag the input reader and every
/// driver consult to know when to stop.
pub struct ConnectionState {
    pub client_connected: AtomicBool,
    pub command_slot: CommandSlot,
}

impl ConnectionState {
    pub fn new() -> ConnectionState {
        ConnectionState {
            client_connected: AtomicBool::new(true),
            command_slot: CommandSlot::new(),
        }
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::new()
    }
}

/// State scoped to a single level: the board, the RW lock that
/// separates ordinary actor activity from the teardown barrier, the
/// per-session RNG, and the shutdown flag that barrier sets.
///
/// Every actor takes the lock in *shared* mode for the duration of one
/// tick; the barrier (run after the player driver returns) takes it in
/// *exclusive* mode, which cannot succeed until every in-flight tick has
/// released its shared guard, and sets `shutdown` before releasing it.
/// This gives "wait for the current actors to quiesce, then stop them"
/// without a global pause flag each actor has to poll mid-tick.
pub struct LevelRuntime {
    pub board: SessionBoard,
    pub barrier: RwLock<()>,
    pub shutdown: AtomicBool,
    pub rng: Mutex<SmallRng>,
}

impl LevelRuntime {
    pub fn new(board: SessionBoard) -> LevelRuntime {
        LevelRuntime {
            board,
            barrier: RwLock::new(()),
            shutdown: AtomicBool::new(false),
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }
}

/// Outcome a level's player driver reports when it stops: whether the
/// player reached a portal (advance to the next level) or the game
/// ended for this player (death, an explicit quit, or disconnection).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    NextLevel,
    Quit,
}

/// Joins every actor spawned for one level, in the order the teardown
/// barrier requires: the player driver first (its return value decides
/// the outcome), then the rest once `shutdown` is set.
///
/// Joins the player driver before touching `shutdown`, then joins the
/// notifier and every ghost thread afterward -- centralized into one
/// helper so no call site can forget a handle.
pub struct ActorGroup<'scope> {
    handles: Vec<ScopedJoinHandle<'scope, ()>>,
}

impl<'scope> ActorGroup<'scope> {
    pub fn new() -> ActorGroup<'scope> {
        ActorGroup { handles: Vec::new() }
    }

    pub fn spawn(&mut self, handle: ScopedJoinHandle<'scope, ()>) {
        self.handles.push(handle);
    }

    /// Join every non-player actor. Panics if a spawned actor panicked,
    /// rather than silently swallowing a crashed thread's state.
    pub fn join_all(self) {
        for handle in self.handles {
            handle.join().expect("session actor thread panicked");
        }
    }
}

impl<'scope> Default for ActorGroup<'scope> {
    fn default() -> Self {
        ActorGroup::new()
    }
}
