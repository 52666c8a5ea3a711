//! Full session lifecycle, end to end: a two-level directory on disk,
//! a scripted player that collects a dot then exits through a portal
//! on level one, and quits outright on level two. Exercises
//! `pacman-level` parsing, `pacman-session`'s level-to-level handoff
//! (points carried forward), and `pacman-proto`'s wire framing all in
//! one pass, rather than any single layer in isolation.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use pacman_proto::BoardHeader;

/// A `Read` that blocks on an `mpsc::Receiver<u8>`, one byte at a time,
/// and reports EOF once the sender is dropped. Stands in for the
/// session's request pipe: nothing is ever actually sent down it in
/// this test (the player's moves are scripted, not interactive), but
/// it must stay open for as long as the session needs to run multiple
/// levels, and close cleanly afterward so the input reader's thread
/// can be joined.
struct ChannelReader(mpsc::Receiver<u8>);

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.0.recv() {
            Ok(byte) => {
                buf[0] = byte;
                Ok(1)
            }
            Err(_) => Ok(0), // sender dropped: treat as EOF, same as a closed pipe
        }
    }
}

fn write_level_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pacman-session-e2e-{:?}", thread::current().id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();

    // Level one: a 3-wide corridor with a dot at (1,0) and a portal at
    // (2,0). The scripted player steps right twice: first step collects
    // the dot, second reaches the portal and advances to level two.
    fs::write(dir.join("01.lvl"), "DIM 3 1\nTEMPO 5\nPAC player1.pac\n..@\n").unwrap();
    fs::write(dir.join("player1.pac"), "PASSO 0\nPOS 0 0\nD\nD\n").unwrap();

    // Level two: the player quits immediately.
    fs::write(dir.join("02.lvl"), "DIM 2 1\nTEMPO 5\nPAC player2.pac\n..\n").unwrap();
    fs::write(dir.join("player2.pac"), "PASSO 0\nPOS 0 0\nQ\n").unwrap();

    dir
}

/// Parse every `BOARD` record out of the notifier's output buffer.
fn parse_boards(mut bytes: &[u8]) -> Vec<(BoardHeader, Vec<u8>)> {
    let mut records = Vec::new();
    while !bytes.is_empty() {
        let header = BoardHeader::read_from(&mut bytes).expect("well-formed header");
        let payload_len = (header.width * header.height) as usize;
        let payload = bytes[..payload_len].to_vec();
        bytes = &bytes[payload_len..];
        records.push((header, payload));
    }
    records
}

#[test]
fn two_levels_carry_points_forward_and_end_with_game_over() {
    let levels_dir = write_level_dir();

    let (tx, rx) = mpsc::channel::<u8>();
    // Keep the request "pipe" open long enough for both levels to run
    // their course, then let it close so the input reader can exit.
    let holder = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        drop(tx);
    });

    let mut req_reader = ChannelReader(rx);
    let mut notif_writer: Vec<u8> = Vec::new();

    pacman_session::run_session(&levels_dir, &mut req_reader, &mut notif_writer);
    holder.join().unwrap();

    let records = parse_boards(&notif_writer);
    assert!(!records.is_empty(), "the session must send at least the final game_over notification");

    let (last_header, last_payload) = records.last().unwrap();
    assert_eq!(last_header.game_over, 1, "the session must end with a game_over notification");
    assert_eq!(last_header.victory, 0, "this game has no victory condition");
    assert!(last_payload.is_empty(), "the game_over header carries no board (width/height are zero)");

    // The NEXT_LEVEL snapshot sent right after the portal exit must
    // report the one dot collected on level one.
    let next_level_snapshot = records
        .iter()
        .find(|(header, _)| header.game_over == 0 && header.accumulated_points > 0)
        .expect("a snapshot reporting the collected dot must have been sent");
    assert_eq!(next_level_snapshot.0.accumulated_points, 1);

    let _ = fs::remove_dir_all(&levels_dir);
}
