//! Integration test for the admission cap scenario: with `MAX_GAMES`
//! slots available, exactly that many concurrent clients progress;
//! anyone past the cap blocks until a slot frees up.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use pacman_admission::Registry;

#[test]
fn three_clients_against_two_slots_admits_two_and_blocks_the_third() {
    let registry = Arc::new(Registry::new(2));
    let admitted = Arc::new(AtomicUsize::new(0));
    // Synchronizes all three client threads so they race for slots at
    // the same instant, rather than racing against thread spawn order.
    let start = Arc::new(Barrier::new(3));

    let mut clients = Vec::new();
    for n in 0..3 {
        let registry = Arc::clone(&registry);
        let admitted = Arc::clone(&admitted);
        let start = Arc::clone(&start);
        clients.push(thread::spawn(move || {
            start.wait();
            let slot = registry.acquire(format!("req-{n}"), format!("notif-{n}"));
            admitted.fetch_add(1, Ordering::SeqCst);
            slot
        }));
    }

    // Give the race a moment to settle: two clients should have been
    // admitted and the third should still be parked in `acquire`.
    thread::sleep(Duration::from_millis(100));
    assert_eq!(admitted.load(Ordering::SeqCst), 2, "only MAX_GAMES clients should be admitted at once");
    assert_eq!(registry.active_sessions().len(), 2);

    // We don't know which of the three threads got in first, so just
    // join whichever handle is already done to free its slot -- that
    // release is what must unblock the third, still-parked client.
    let mut remaining = Vec::new();
    let mut released_one = false;
    for handle in clients {
        if !released_one && handle.is_finished() {
            let slot = handle.join().unwrap();
            registry.release(slot);
            released_one = true;
        } else {
            remaining.push(handle);
        }
    }
    assert!(released_one, "at least one of the first two clients must have finished acquiring");

    for handle in remaining {
        let slot = handle.join().unwrap();
        registry.release(slot);
    }

    assert_eq!(admitted.load(Ordering::SeqCst), 3, "the third client must eventually be admitted");
    assert!(registry.active_sessions().is_empty());
}
