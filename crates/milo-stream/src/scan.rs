//! Terminator scanners.
//!
//! When a record cannot be interpreted its bytes are captured verbatim up to
//! the next terminator. Two scanning strategies exist, one per call site:
//!
//! - [`ScanMode::ByteResync`] (entry payloads): walk byte by byte; an `0xAD`
//!   triggers a three-byte lookahead for `DE AD DE`. On a miss only the
//!   `0xAD` is captured and scanning resumes at the very next byte, so a
//!   sentinel starting inside the failed window is still found.
//! - [`ScanMode::AlignedWindow`] (a directory's own object): at every offset
//!   decode a full four-byte window in the stream byte order and compare it to
//!   the terminator value; on a miss capture one byte and slide by one.
//!
//! Both consume the terminator and exclude it from the capture. Running out
//! of input first is [`StreamError::UnterminatedCapture`].

use milo_types::TERMINATOR;
use tracing::debug;

use crate::error::{StreamError, StreamResult};
use crate::stream::BinaryStream;

/// Which terminator scanner to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScanMode {
    /// Single-byte trigger with resync after a failed lookahead.
    ByteResync,
    /// Full four-byte window compared at every offset.
    AlignedWindow,
}

/// Capture bytes from the current position up to (not including) the next
/// terminator, leaving the cursor just past the terminator.
pub fn capture_until_terminator(
    stream: &mut BinaryStream,
    mode: ScanMode,
) -> StreamResult<Vec<u8>> {
    let start = stream.position();
    let captured = match mode {
        ScanMode::ByteResync => scan_byte_resync(stream, start)?,
        ScanMode::AlignedWindow => scan_aligned_window(stream, start)?,
    };
    debug!(start, len = captured.len(), ?mode, "captured bytes up to terminator");
    Ok(captured)
}

fn scan_byte_resync(stream: &mut BinaryStream, start: u64) -> StreamResult<Vec<u8>> {
    let mut captured = Vec::new();
    loop {
        if stream.is_at_end() {
            return Err(StreamError::UnterminatedCapture {
                start,
                scanned: captured.len(),
            });
        }
        let byte = stream.read_u8()?;
        if byte == TERMINATOR[0] && stream.peek(3) == Some(&TERMINATOR[1..]) {
            stream.seek_to(stream.position() + 3);
            return Ok(captured);
        }
        captured.push(byte);
    }
}

fn scan_aligned_window(stream: &mut BinaryStream, start: u64) -> StreamResult<Vec<u8>> {
    let expected = stream.endian().terminator_value();
    let mut captured = Vec::new();
    loop {
        let window_at = stream.position();
        let value = match stream.read_u32() {
            Ok(value) => value,
            Err(StreamError::UnexpectedEof { .. }) => {
                return Err(StreamError::UnterminatedCapture {
                    start,
                    scanned: captured.len(),
                });
            }
            Err(e) => return Err(e),
        };
        if value == expected {
            return Ok(captured);
        }
        stream.seek_to(window_at);
        captured.push(stream.read_u8()?);
    }
}
