//! A single client's game session: the actor threads that drive the
//! player, the ghosts, and the board notifications, and the level
//! lifecycle that spawns and retires them.
//!
//! Every actor is a plain OS thread on a sleep-then-tick cadence --
//! there is no async runtime here, matching the rest of this
//! workspace's preference for `std::thread` plus `parking_lot` over a
//! task scheduler for I/O-light, CPU-light concurrency.

mod actors;
mod board;
mod command_slot;
mod runtime;
mod session;

pub use actors::{ghost_driver, input_reader, notifier, player_driver, send_game_over};
pub use board::SessionBoard;
pub use command_slot::CommandSlot;
pub use runtime::{ActorGroup, ConnectionState, LevelOutcome, LevelRuntime};
pub use session::{run_level, run_session};
