use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use pacman_proto::ConnectMessage;

use crate::registry::Registry;

/// Open a session's private pipes and run it to completion, then
/// release its slot.
///
/// Opens the notification pipe for writing first (the client is
/// expected to have its read end open already), then the request pipe
/// for reading; bails out and releases the slot if either open fails,
/// otherwise hands both ends to the session runtime.
pub fn run_connection(registry: Arc<Registry>, levels_dir: PathBuf, connect: ConnectMessage) {
    let slot = registry.acquire(connect.req_pipe_path.clone(), connect.notif_pipe_path.clone());
    tracing::info!(id = slot.id, req = %connect.req_pipe_path, notif = %connect.notif_pipe_path, "session connecting");

    let mut notif_file = match OpenOptions::new().write(true).open(&connect.notif_pipe_path) {
        Ok(f) => f,
        Err(err) => {
            tracing::warn!(id = slot.id, path = %connect.notif_pipe_path, error = %err, "failed to open notification pipe");
            registry.release(slot);
            return;
        }
    };

    let mut req_file = match OpenOptions::new().read(true).open(&connect.req_pipe_path) {
        Ok(f) => f,
        Err(err) => {
            tracing::warn!(id = slot.id, path = %connect.req_pipe_path, error = %err, "failed to open request pipe");
            registry.release(slot);
            return;
        }
    };

    pacman_session::run_session(&levels_dir, &mut req_file, &mut notif_file);

    tracing::info!(id = slot.id, "session finished");
    registry.release(slot);
}
