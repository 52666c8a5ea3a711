use parking_lot::Mutex;
use pacman_common::Key;

/// A single-slot overwrite buffer between the input reader and the
/// interactive player driver.
///
/// There is no queue: a keystroke that arrives before the previous one
/// was consumed by the player's tick simply replaces it, and the slot
/// is cleared on each consuming tick.
#[derive(Default)]
pub struct CommandSlot(Mutex<Option<Key>>);

impl CommandSlot {
    pub fn new() -> CommandSlot {
        CommandSlot(Mutex::new(None))
    }

    /// Overwrite whatever command is currently queued.
    pub fn set(&self, key: Key) {
        *self.0.lock() = Some(key);
    }

    /// Take and clear the queued command, if any.
    pub fn take(&self) -> Option<Key> {
        self.0.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacman_common::Direction;

    #[test]
    fn newer_command_clobbers_unread_older_one() {
        let slot = CommandSlot::new();
        slot.set(Key::Step(Direction::Up));
        slot.set(Key::Step(Direction::Down));
        assert_eq!(slot.take(), Some(Key::Step(Direction::Down)));
        assert_eq!(slot.take(), None);
    }
}
