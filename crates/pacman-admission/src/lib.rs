//! Bounded admission of new sessions: the rendezvous FIFO, the slot
//! registry that caps how many games run concurrently, and the
//! per-connection worker that opens a session's pipes and drives it.

mod registry;
mod rendezvous;
mod worker;

pub use registry::{Registry, SessionInfo, Slot};
pub use rendezvous::{create_fifo, listen};
pub use worker::run_connection;
