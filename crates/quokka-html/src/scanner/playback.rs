//! Byte stream that can rewind to its beginning once.
//!
//! Every byte read is remembered until the scanner either commits to the
//! current encoding ([`PlaybackStream::clear`]) or finds a `<meta>` charset
//! and starts over ([`PlaybackStream::playback`]).

use std::fmt;
use std::io::{self, Read};

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Bytes from the source are appended to the buffer.
    Recording,
    /// Bytes are served from the buffer, then from the source.
    Playback,
    /// Buffering stopped; only pushed-back bytes remain in the buffer.
    Cleared,
}

/// Recording wrapper around a byte source.
pub struct PlaybackStream {
    source: Box<dyn Read>,
    buffer: Vec<u8>,
    position: usize,
    mode: Mode,
    detected: bool,
}

impl fmt::Debug for PlaybackStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackStream")
            .field("buffered", &self.buffer.len())
            .field("position", &self.position)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl PlaybackStream {
    /// Wrap `source`, recording from the first byte.
    pub fn new(source: impl Read + 'static) -> Self {
        Self {
            source: Box::new(source),
            buffer: Vec::new(),
            position: 0,
            mode: Mode::Recording,
            detected: false,
        }
    }

    /// Sniff a byte order mark.
    ///
    /// The sniffed bytes are pushed back, so the next read sees the BOM; a
    /// BOM-removing decoder drops it. Only the first call looks at the input.
    ///
    /// # Errors
    /// Propagates read failures from the source.
    pub fn detect_encoding(&mut self) -> io::Result<Option<&'static Encoding>> {
        if self.detected {
            return Ok(None);
        }
        self.detected = true;
        while self.buffer.len() < 3 {
            let mut chunk = [0u8; 3];
            let wanted = 3 - self.buffer.len();
            let count = self.source.read(&mut chunk[..wanted])?;
            if count == 0 {
                break;
            }
            self.buffer.extend_from_slice(&chunk[..count]);
        }
        let encoding = match self.buffer.as_slice() {
            [0xEF, 0xBB, 0xBF, ..] => Some(UTF_8),
            [0xFF, 0xFE, ..] => Some(UTF_16LE),
            [0xFE, 0xFF, ..] => Some(UTF_16BE),
            _ => None,
        };
        Ok(encoding)
    }

    /// Restart from the first recorded byte.
    ///
    /// The buffer is released automatically once the replay catches up with
    /// the source.
    pub fn playback(&mut self) {
        if self.mode == Mode::Cleared {
            return;
        }
        self.position = 0;
        if self.buffer.is_empty() {
            self.mode = Mode::Cleared;
        } else {
            self.mode = Mode::Playback;
        }
    }

    /// Stop recording and free what was recorded.
    ///
    /// Has no effect while a replay is in progress.
    pub fn clear(&mut self) {
        match self.mode {
            Mode::Playback | Mode::Cleared => {}
            Mode::Recording => {
                let _ = self.buffer.drain(..self.position);
                self.position = 0;
                self.mode = Mode::Cleared;
            }
        }
    }

    /// Whether bytes are still being recorded.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.mode == Mode::Recording
    }

    /// Whether a replay is in progress.
    #[must_use]
    pub fn is_playing_back(&self) -> bool {
        self.mode == Mode::Playback
    }

    /// Number of bytes held in memory.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

impl Read for PlaybackStream {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.position < self.buffer.len() {
            let count = out.len().min(self.buffer.len() - self.position);
            out[..count].copy_from_slice(&self.buffer[self.position..self.position + count]);
            self.position += count;
            if self.position == self.buffer.len() && self.mode != Mode::Recording {
                self.buffer = Vec::new();
                self.position = 0;
                self.mode = Mode::Cleared;
            }
            return Ok(count);
        }
        let count = self.source.read(out)?;
        if self.mode == Mode::Recording {
            self.buffer.extend_from_slice(&out[..count]);
            self.position += count;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn read_all(stream: &mut PlaybackStream) -> Vec<u8> {
        let mut out = Vec::new();
        let _ = stream.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_playback_replays_from_start() {
        let mut stream = PlaybackStream::new(Cursor::new(b"<html>abc".to_vec()));
        let mut first = [0u8; 4];
        stream.read_exact(&mut first).unwrap();
        assert_eq!(&first, b"<htm");
        stream.playback();
        assert!(stream.is_playing_back());
        assert_eq!(read_all(&mut stream), b"<html>abc");
        assert!(!stream.is_recording());
        assert_eq!(stream.buffered_len(), 0);
    }

    #[test]
    fn test_clear_during_playback_is_ignored() {
        let mut stream = PlaybackStream::new(Cursor::new(b"0123456789".to_vec()));
        let mut head = [0u8; 5];
        stream.read_exact(&mut head).unwrap();
        stream.playback();
        stream.clear();
        assert!(stream.is_playing_back());
        assert_eq!(read_all(&mut stream), b"0123456789");
    }

    #[test]
    fn test_clear_stops_recording() {
        let mut stream = PlaybackStream::new(Cursor::new(b"abcdef".to_vec()));
        let mut head = [0u8; 2];
        stream.read_exact(&mut head).unwrap();
        stream.clear();
        assert_eq!(stream.buffered_len(), 0);
        assert_eq!(read_all(&mut stream), b"cdef");
        stream.playback();
        assert!(read_all(&mut stream).is_empty());
    }

    #[test]
    fn test_detect_encoding_pushes_bytes_back() {
        let mut stream = PlaybackStream::new(Cursor::new(vec![0xEF, 0xBB, 0xBF, b'h', b'i']));
        assert_eq!(stream.detect_encoding().unwrap(), Some(UTF_8));
        assert_eq!(read_all(&mut stream), vec![0xEF, 0xBB, 0xBF, b'h', b'i']);

        let mut stream = PlaybackStream::new(Cursor::new(vec![0xFF, 0xFE, b'h', 0]));
        assert_eq!(stream.detect_encoding().unwrap(), Some(UTF_16LE));

        let mut stream = PlaybackStream::new(Cursor::new(b"<p>".to_vec()));
        assert_eq!(stream.detect_encoding().unwrap(), None);
        assert_eq!(read_all(&mut stream), b"<p>");
    }

    #[test]
    fn test_detect_on_short_input() {
        let mut stream = PlaybackStream::new(Cursor::new(b"x".to_vec()));
        assert_eq!(stream.detect_encoding().unwrap(), None);
        assert_eq!(read_all(&mut stream), b"x");
    }
}
