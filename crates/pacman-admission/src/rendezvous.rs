use std::ffi::CString;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use pacman_proto::{ConnectMessage, ProtoError};

use crate::registry::Registry;
use crate::worker::run_connection;

/// Create the rendezvous FIFO at `path`, tolerating it already existing
/// from a previous run (`EEXIST` from `mkfifo` is treated as success,
/// not a startup failure).
pub fn create_fifo(path: &Path) -> io::Result<()> {
    let c_path = CString::new(path.as_os_str().as_encoded_bytes()).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let result = unsafe { libc::mkfifo(c_path.as_ptr(), 0o666) };
    if result == -1 {
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::AlreadyExists {
            return Err(err);
        }
    }
    Ok(())
}

/// Listen on the rendezvous FIFO for `CONNECT` records, forever.
///
/// Opens the endpoint read-write: a FIFO opened read-only sees EOF
/// once every writer closes, so it is opened `O_RDWR` to keep it open
/// across client churn. Each accepted connection is dispatched to its
/// own detached worker thread -- the admission loop never blocks on a
/// single session's lifetime, only on the registry's slot count.
pub fn listen(rendezvous_path: &Path, levels_dir: &Path, registry: Arc<Registry>) -> io::Result<()> {
    let mut endpoint = OpenOptions::new().read(true).write(true).open(rendezvous_path)?;
    tracing::info!(path = %rendezvous_path.display(), capacity = registry.capacity(), "listening for connections");

    loop {
        let connect = match ConnectMessage::read_from(&mut endpoint) {
            Ok(connect) => connect,
            Err(ProtoError::UnknownOpCode(op)) => {
                tracing::debug!(op_code = op, "ignoring unrecognized rendezvous record");
                continue;
            }
            Err(err) => {
                tracing::warn!(error = %err, "malformed rendezvous record, continuing to listen");
                continue;
            }
        };

        let registry = Arc::clone(&registry);
        let levels_dir: PathBuf = levels_dir.to_path_buf();
        thread::spawn(move || run_connection(registry, levels_dir, connect));
    }
}
