//! Wire framing for the three pipes a session speaks over: the shared
//! rendezvous endpoint, and each session's private request and
//! notification pipes.
//!
//! Every record is fixed-width and little-endian, mirroring the
//! original server's C `struct` layout: a 4-byte `op_code` followed by
//! the record's fields, with path fields as fixed-length byte buffers
//! rather than length-prefixed strings.

use std::io::{self, Read, Write};

use pacman_common::Cell;

pub const MAX_PIPE_PATH_LENGTH: usize = 40;

pub const OP_CONNECT: i32 = 1;
pub const OP_DISCONNECT: i32 = 2;
pub const OP_PLAY: i32 = 3;
pub const OP_BOARD: i32 = 4;

/// Error decoding a record off a pipe. Distinct from the `io::Error`
/// a short read or a closed pipe produces -- this is a well-formed
/// read that didn't decode to something we understand.
#[derive(Debug)]
pub enum ProtoError {
    Io(io::Error),
    UnknownOpCode(i32),
    PathNotUtf8,
}

impl std::fmt::Display for ProtoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtoError::Io(e) => write!(f, "i/o error: {e}"),
            ProtoError::UnknownOpCode(op) => write!(f, "unknown op_code {op}"),
            ProtoError::PathNotUtf8 => write!(f, "pipe path field is not valid UTF-8"),
        }
    }
}

impl std::error::Error for ProtoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtoError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProtoError {
    fn from(e: io::Error) -> Self {
        ProtoError::Io(e)
    }
}

fn read_i32_le(r: &mut impl Read) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn write_i32_le(w: &mut impl Write, v: i32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn decode_path(buf: [u8; MAX_PIPE_PATH_LENGTH]) -> Result<String, ProtoError> {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    std::str::from_utf8(&buf[..end])
        .map(str::to_owned)
        .map_err(|_| ProtoError::PathNotUtf8)
}

fn encode_path(path: &str) -> [u8; MAX_PIPE_PATH_LENGTH] {
    let mut buf = [0u8; MAX_PIPE_PATH_LENGTH];
    let bytes = path.as_bytes();
    let n = bytes.len().min(MAX_PIPE_PATH_LENGTH - 1); // leave room for the NUL terminator
    buf[..n].copy_from_slice(&bytes[..n]);
    buf
}

// ── CONNECT (rendezvous endpoint) ───────────────────────────────────────

/// A `CONNECT` record read off the rendezvous endpoint: a new client
/// announcing the two pipe paths it has already created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectMessage {
    pub req_pipe_path: String,
    pub notif_pipe_path: String,
}

impl ConnectMessage {
    pub const WIRE_SIZE: usize = 4 + MAX_PIPE_PATH_LENGTH + MAX_PIPE_PATH_LENGTH;

    pub fn read_from(r: &mut impl Read) -> Result<ConnectMessage, ProtoError> {
        let op = read_i32_le(r)?;
        if op != OP_CONNECT {
            return Err(ProtoError::UnknownOpCode(op));
        }
        let mut req = [0u8; MAX_PIPE_PATH_LENGTH];
        r.read_exact(&mut req)?;
        let mut notif = [0u8; MAX_PIPE_PATH_LENGTH];
        r.read_exact(&mut notif)?;
        Ok(ConnectMessage {
            req_pipe_path: decode_path(req)?,
            notif_pipe_path: decode_path(notif)?,
        })
    }

    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        write_i32_le(w, OP_CONNECT)?;
        w.write_all(&encode_path(&self.req_pipe_path))?;
        w.write_all(&encode_path(&self.notif_pipe_path))
    }
}

// ── Request pipe: PLAY / DISCONNECT ─────────────────────────────────────

/// A record read off a session's private request pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMessage {
    /// `PLAY`: the single wire byte naming the requested command.
    Play(u8),
    Disconnect,
}

impl RequestMessage {
    pub fn read_from(r: &mut impl Read) -> Result<RequestMessage, ProtoError> {
        let op = read_i32_le(r)?;
        match op {
            OP_PLAY => {
                let mut cmd = [0u8; 1];
                r.read_exact(&mut cmd)?;
                Ok(RequestMessage::Play(cmd[0]))
            }
            OP_DISCONNECT => Ok(RequestMessage::Disconnect),
            other => Err(ProtoError::UnknownOpCode(other)),
        }
    }

    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        match self {
            RequestMessage::Play(cmd) => {
                write_i32_le(w, OP_PLAY)?;
                w.write_all(&[*cmd])
            }
            RequestMessage::Disconnect => write_i32_le(w, OP_DISCONNECT),
        }
    }
}

// ── Notification pipe: BOARD ────────────────────────────────────────────

/// The fixed header that precedes every board snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardHeader {
    pub width: i32,
    pub height: i32,
    pub tempo: i32,
    pub victory: i32,
    pub game_over: i32,
    pub accumulated_points: i32,
}

impl BoardHeader {
    pub const WIRE_SIZE: usize = 4 * 7;

    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        write_i32_le(w, OP_BOARD)?;
        write_i32_le(w, self.width)?;
        write_i32_le(w, self.height)?;
        write_i32_le(w, self.tempo)?;
        write_i32_le(w, self.victory)?;
        write_i32_le(w, self.game_over)?;
        write_i32_le(w, self.accumulated_points)
    }

    pub fn read_from(r: &mut impl Read) -> Result<BoardHeader, ProtoError> {
        let op = read_i32_le(r)?;
        if op != OP_BOARD {
            return Err(ProtoError::UnknownOpCode(op));
        }
        Ok(BoardHeader {
            width: read_i32_le(r)?,
            height: read_i32_le(r)?,
            tempo: read_i32_le(r)?,
            victory: read_i32_le(r)?,
            game_over: read_i32_le(r)?,
            accumulated_points: read_i32_le(r)?,
        })
    }
}

/// Write a full board snapshot (header + `width * height` grid bytes)
/// to the notification pipe in one call.
pub fn write_board_snapshot(w: &mut impl Write, header: &BoardHeader, cells: &[Cell]) -> io::Result<()> {
    debug_assert_eq!(cells.len(), (header.width * header.height) as usize);
    header.write_to(w)?;
    let payload: Vec<u8> = cells.iter().map(|&c| resolve_cell_byte(c)).collect();
    w.write_all(&payload)
}

/// Resolve a cell to its wire byte. Actor sigil beats portal beats dot
/// beats empty; wall is exclusive -- but since [`Cell::content`]
/// already reflects occupancy, this reduces to a single match on
/// `content` with the decorations only consulted for an otherwise
/// empty cell.
pub fn resolve_cell_byte(cell: Cell) -> u8 {
    use pacman_common::Content;
    match cell.content {
        Content::Wall => b'#',
        Content::Player => b'C',
        Content::Ghost => b'M',
        Content::Empty => {
            if cell.has_portal {
                b'@'
            } else if cell.has_dot {
                b'.'
            } else {
                b' '
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacman_common::Content;
    use std::io::Cursor;

    #[test]
    fn connect_message_round_trips() {
        let msg = ConnectMessage {
            req_pipe_path: "/tmp/req.42".to_string(),
            notif_pipe_path: "/tmp/notif.42".to_string(),
        };
        let mut buf = Vec::new();
        msg.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), ConnectMessage::WIRE_SIZE);

        let mut cursor = Cursor::new(buf);
        let decoded = ConnectMessage::read_from(&mut cursor).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn play_and_disconnect_round_trip() {
        let mut buf = Vec::new();
        RequestMessage::Play(b'D').write_to(&mut buf).unwrap();
        RequestMessage::Disconnect.write_to(&mut buf).unwrap();

        let mut cursor = Cursor::new(buf);
        assert_eq!(RequestMessage::read_from(&mut cursor).unwrap(), RequestMessage::Play(b'D'));
        assert_eq!(RequestMessage::read_from(&mut cursor).unwrap(), RequestMessage::Disconnect);
    }

    #[test]
    fn board_header_round_trips() {
        let header = BoardHeader {
            width: 10,
            height: 5,
            tempo: 300,
            victory: 0,
            game_over: 1,
            accumulated_points: 42,
        };
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), BoardHeader::WIRE_SIZE);

        let mut cursor = Cursor::new(buf);
        assert_eq!(BoardHeader::read_from(&mut cursor).unwrap(), header);
    }

    #[test]
    fn alphabet_priority_sigil_beats_portal_beats_dot_beats_empty() {
        assert_eq!(resolve_cell_byte(Cell::wall()), b'#');
        assert_eq!(
            resolve_cell_byte(Cell {
                content: Content::Player,
                has_dot: true,
                has_portal: true,
            }),
            b'C'
        );
        assert_eq!(resolve_cell_byte(Cell::portal()), b'@');
        assert_eq!(resolve_cell_byte(Cell::dotted()), b'.');
        assert_eq!(resolve_cell_byte(Cell::empty()), b' ');
    }

    #[test]
    fn path_encoding_truncates_and_nul_terminates() {
        let long = "x".repeat(100);
        let encoded = encode_path(&long);
        assert_eq!(encoded.len(), MAX_PIPE_PATH_LENGTH);
        assert_eq!(encoded[MAX_PIPE_PATH_LENGTH - 1], 0);
    }
}
