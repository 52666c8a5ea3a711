use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// One admitted session's rendezvous-time identity, kept around only
/// for the lifetime of its slot so the registry can report who is
/// occupying it.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: u64,
    pub req_pipe_path: String,
    pub notif_pipe_path: String,
}

/// A counting semaphore backed by a bounded channel pre-loaded with
/// `capacity` permits, paired with a lookup table of who currently
/// holds one.
///
/// A `crossbeam_channel` carries the blocking-with-backpressure
/// behavior a bounded resource needs, and an `FxHashMap` behind an
/// `RwLock` is a process-table shape generalized here from PIDs to
/// session ids. `sem_wait`/`sem_post` become `recv`/`send` on a channel
/// pre-filled with `MAX_GAMES` unit permits: `recv` blocks exactly when
/// a POSIX semaphore wait would.
pub struct Registry {
    sessions: RwLock<FxHashMap<u64, SessionInfo>>,
    next_id: AtomicU64,
    permit_tx: Sender<()>,
    permit_rx: Receiver<()>,
    capacity: usize,
}

/// A claimed admission permit. Dropping it without calling
/// [`Registry::release`] would leak the slot forever, so there is no
/// `Drop` impl here -- the slot must stay held for the lifetime of a
/// detached worker thread, not a lexical scope, and callers are
/// expected to release it from that thread's tail.
pub struct Slot {
    pub id: u64,
}

impl Registry {
    pub fn new(capacity: usize) -> Registry {
        let (permit_tx, permit_rx) = bounded(capacity);
        for _ in 0..capacity {
            permit_tx.send(()).expect("freshly created bounded channel always accepts up to its capacity");
        }
        Registry {
            sessions: RwLock::new(FxHashMap::default()),
            next_id: AtomicU64::new(1),
            permit_tx,
            permit_rx,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Block until a permit is available, then register the session
    /// under a freshly minted id.
    pub fn acquire(&self, req_pipe_path: String, notif_pipe_path: String) -> Slot {
        self.permit_rx
            .recv()
            .expect("the registry holds its own sender for this channel's lifetime, so recv cannot disconnect");

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sessions.write().insert(id, SessionInfo { id, req_pipe_path, notif_pipe_path });
        Slot { id }
    }

    /// Unregister a session and return its permit to the pool, waking
    /// exactly one blocked `acquire` (there is exactly one slot's worth
    /// of room to hand back).
    pub fn release(&self, slot: Slot) {
        self.sessions.write().remove(&slot.id);
        self.permit_tx
            .send(())
            .expect("this permit was checked out from the same bounded channel, so there is always room for it back");
    }

    /// A snapshot of every currently occupied slot, for diagnostics.
    pub fn active_sessions(&self) -> Vec<SessionInfo> {
        self.sessions.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn acquire_reuses_released_slots_up_to_capacity() {
        let registry = Registry::new(2);
        let a = registry.acquire("a-req".into(), "a-notif".into());
        let b = registry.acquire("b-req".into(), "b-notif".into());
        assert_eq!(registry.active_sessions().len(), 2);

        registry.release(a);
        let c = registry.acquire("c-req".into(), "c-notif".into());
        assert_eq!(registry.active_sessions().len(), 2);
        registry.release(b);
        registry.release(c);
        assert!(registry.active_sessions().is_empty());
    }

    #[test]
    fn acquire_blocks_until_a_slot_frees_up() {
        let registry = Arc::new(Registry::new(1));
        let first = registry.acquire("x-req".into(), "x-notif".into());

        let registry_clone = Arc::clone(&registry);
        let waiter = thread::spawn(move || registry_clone.acquire("y-req".into(), "y-notif".into()));

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished(), "second acquire should still be blocked");

        registry.release(first);
        let second = waiter.join().unwrap();
        assert_eq!(registry.active_sessions().len(), 1);
        registry.release(second);
    }

    #[test]
    fn zero_capacity_registry_never_admits() {
        let registry = Arc::new(Registry::new(0));
        let registry_clone = Arc::clone(&registry);
        let waiter = thread::spawn(move || registry_clone.acquire("z-req".into(), "z-notif".into()));
        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished(), "a zero-capacity registry must never hand out a permit");
    }
}
