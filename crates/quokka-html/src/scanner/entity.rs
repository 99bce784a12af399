//! The scanner's view of one input source.
//!
//! A [`CurrentEntity`] owns a decoded character window over its source and
//! tracks line, column and character offset while the scanner reads,
//! rewinds and peeks.

use std::io::Read;

use encoding_rs::{Decoder, Encoding};

use super::playback::PlaybackStream;
use crate::error::Result;
use crate::event::Position;

/// Characters requested per refill.
const CHUNK: usize = 2048;
/// Characters kept behind the read offset when the window is compacted.
const KEEP_BEHIND: usize = 1024;
/// Read offset at which compaction is considered.
const COMPACT_AT: usize = 4 * CHUNK;

/// Identifiers describing where an entity's text came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInfo {
    /// Encoding label in effect.
    pub encoding: Option<String>,
    /// Public identifier.
    pub public_id: Option<String>,
    /// Base against which the system identifier is resolved.
    pub base_system_id: Option<String>,
    /// System identifier as given.
    pub literal_system_id: Option<String>,
    /// System identifier resolved against the base.
    pub expanded_system_id: Option<String>,
}

/// Resolve `system_id` against `base` the way relative URLs resolve.
#[must_use]
pub fn expand_system_id(system_id: Option<&str>, base: Option<&str>) -> Option<String> {
    let system_id = system_id?;
    if system_id.contains("://") || system_id.starts_with('/') {
        return Some(system_id.to_string());
    }
    match base {
        Some(base) => {
            let dir = base.rfind('/').map_or("", |index| &base[..=index]);
            Some(format!("{dir}{system_id}"))
        }
        None => Some(system_id.to_string()),
    }
}

enum CharSource {
    Bytes {
        stream: PlaybackStream,
        decoder: Decoder,
        finished: bool,
    },
    Text {
        chars: Vec<char>,
        position: usize,
    },
    Empty,
}

impl CharSource {
    /// Append the next decoded chunk to `out`. Returns `false` at end of input.
    fn fill(&mut self, out: &mut Vec<char>) -> Result<bool> {
        match self {
            Self::Bytes {
                stream,
                decoder,
                finished,
            } => {
                let mut bytes = [0u8; CHUNK];
                while !*finished {
                    let count = stream.read(&mut bytes)?;
                    let last = count == 0;
                    let capacity = decoder
                        .max_utf8_buffer_length(count)
                        .unwrap_or(count * 4 + 16);
                    let mut decoded = String::with_capacity(capacity);
                    let (_result, _read, _replaced) =
                        decoder.decode_to_string(&bytes[..count], &mut decoded, last);
                    *finished = last;
                    if !decoded.is_empty() {
                        out.extend(decoded.chars());
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Text { chars, position } => {
                if *position >= chars.len() {
                    return Ok(false);
                }
                let end = (*position + CHUNK).min(chars.len());
                out.extend_from_slice(&chars[*position..end]);
                *position = end;
                Ok(true)
            }
            Self::Empty => Ok(false),
        }
    }
}

/// Saved read position, restorable with [`CurrentEntity::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    index: usize,
    position: Position,
}

/// Decoded character window over one input source.
pub struct CurrentEntity {
    source: CharSource,
    buffer: Vec<char>,
    /// Read offset into `buffer`.
    offset: usize,
    /// Characters dropped from the front of `buffer` so far.
    base: usize,
    /// Absolute index that compaction must keep.
    pin: Option<usize>,
    line: usize,
    column: usize,
    char_offset: usize,
    end_reached: bool,
    info: SourceInfo,
}

impl CurrentEntity {
    fn with_source(source: CharSource, info: SourceInfo) -> Self {
        Self {
            source,
            buffer: Vec::with_capacity(CHUNK),
            offset: 0,
            base: 0,
            pin: None,
            line: 1,
            column: 1,
            char_offset: 0,
            end_reached: false,
            info,
        }
    }

    /// Entity over an in-memory string.
    #[must_use]
    pub fn from_text(text: &str, info: SourceInfo) -> Self {
        let chars = text.chars().collect();
        Self::with_source(CharSource::Text { chars, position: 0 }, info)
    }

    /// Entity decoding `stream` with `encoding`, dropping a matching BOM.
    #[must_use]
    pub fn from_bytes(stream: PlaybackStream, encoding: &'static Encoding, info: SourceInfo) -> Self {
        let decoder = encoding.new_decoder_with_bom_removal();
        Self::with_source(
            CharSource::Bytes {
                stream,
                decoder,
                finished: false,
            },
            info,
        )
    }

    /// Entity with no content.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_source(CharSource::Empty, SourceInfo::default())
    }

    /// Where this entity's text came from.
    #[must_use]
    pub const fn info(&self) -> &SourceInfo {
        &self.info
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.char_offset,
        }
    }

    /// Pull the next chunk from the source. Returns `false` at end of input.
    pub fn load(&mut self) -> Result<bool> {
        if self.end_reached {
            return Ok(false);
        }
        self.compact();
        if self.source.fill(&mut self.buffer)? {
            Ok(true)
        } else {
            self.end_reached = true;
            Ok(false)
        }
    }

    fn compact(&mut self) {
        if self.offset < COMPACT_AT {
            return;
        }
        let mut keep_from = self.offset - KEEP_BEHIND;
        if let Some(pin) = self.pin {
            keep_from = keep_from.min(pin.saturating_sub(self.base));
        }
        if keep_from == 0 {
            return;
        }
        let _ = self.buffer.drain(..keep_from);
        self.offset -= keep_from;
        self.base += keep_from;
    }

    /// Read one character, or `None` at end of input.
    pub fn read(&mut self) -> Result<Option<char>> {
        if self.offset == self.buffer.len() && !self.load()? {
            return Ok(None);
        }
        let c = self.buffer[self.offset];
        self.offset += 1;
        self.column += 1;
        self.char_offset += 1;
        Ok(Some(c))
    }

    /// Un-read `count` characters on the current line.
    pub fn rewind(&mut self, count: usize) {
        let count = count.min(self.offset);
        self.offset -= count;
        self.column = self.column.saturating_sub(count).max(1);
        self.char_offset -= count;
    }

    /// Character `ahead` positions past the read offset, without consuming.
    pub fn peek(&mut self, ahead: usize) -> Result<Option<char>> {
        while self.offset + ahead >= self.buffer.len() {
            if !self.load()? {
                return Ok(None);
            }
        }
        Ok(Some(self.buffer[self.offset + ahead]))
    }

    /// Up to `len` upcoming characters, without consuming.
    pub fn next_content(&mut self, len: usize) -> Result<String> {
        let mut content = String::with_capacity(len);
        for ahead in 0..len {
            match self.peek(ahead)? {
                Some(c) => content.push(c),
                None => break,
            }
        }
        Ok(content)
    }

    /// Everything already decoded past the read offset, loading at least
    /// `min` characters when the source has them.
    pub fn buffered_remainder(&mut self, min: usize) -> Result<String> {
        let _ = self.peek(min.saturating_sub(1))?;
        Ok(self.buffer[self.offset..].iter().collect())
    }

    /// Remember the current position and keep it reachable.
    pub fn mark(&mut self) -> Mark {
        let index = self.base + self.offset;
        self.pin = Some(index);
        Mark {
            index,
            position: self.position(),
        }
    }

    /// Return to `mark` and release it.
    pub fn reset(&mut self, mark: Mark) {
        self.offset = mark.index.saturating_sub(self.base);
        self.line = mark.position.line;
        self.column = mark.position.column;
        self.char_offset = mark.position.offset;
        self.pin = None;
    }

    /// Consume a run of line breaks. `\r`, `\n` and `\r\n` each count once.
    pub fn skip_newlines(&mut self) -> Result<usize> {
        let mut newlines = 0;
        loop {
            match self.peek(0)? {
                Some('\n') => {
                    self.offset += 1;
                    self.char_offset += 1;
                }
                Some('\r') => {
                    self.offset += 1;
                    self.char_offset += 1;
                    if self.peek(0)? == Some('\n') {
                        self.offset += 1;
                        self.char_offset += 1;
                    }
                }
                _ => break,
            }
            newlines += 1;
        }
        if newlines > 0 {
            self.line += newlines;
            self.column = 1;
        }
        Ok(newlines)
    }

    /// Account for a line break consumed with [`read`](Self::read).
    pub const fn inc_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    /// Replace the window with already-scanned `text` starting at `at`.
    pub fn reset_buffer(&mut self, text: &str, at: Position) {
        self.buffer = text.chars().collect();
        self.offset = 0;
        self.base = 0;
        self.pin = None;
        self.line = at.line;
        self.column = at.column;
        self.char_offset = at.offset;
    }

    /// Restart decoding from the first recorded byte with a new encoding.
    ///
    /// Returns `false` when this entity does not read from a byte stream.
    pub fn replay_with(&mut self, encoding: &'static Encoding) -> bool {
        let CharSource::Bytes {
            stream,
            decoder,
            finished,
        } = &mut self.source
        else {
            return false;
        };
        stream.playback();
        *decoder = encoding.new_decoder_with_bom_removal();
        *finished = false;
        self.buffer.clear();
        self.offset = 0;
        self.base = 0;
        self.pin = None;
        self.line = 1;
        self.column = 1;
        self.char_offset = 0;
        self.end_reached = false;
        self.info.encoding = Some(encoding.name().to_string());
        true
    }

    /// Stop recording bytes for a possible replay.
    pub fn clear_playback(&mut self) {
        if let CharSource::Bytes { stream, .. } = &mut self.source {
            stream.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use encoding_rs::{UTF_8, WINDOWS_1252};

    use super::*;

    fn text(input: &str) -> CurrentEntity {
        CurrentEntity::from_text(input, SourceInfo::default())
    }

    #[test]
    fn test_read_and_rewind_track_position() {
        let mut entity = text("ab");
        assert_eq!(entity.read().unwrap(), Some('a'));
        assert_eq!(entity.read().unwrap(), Some('b'));
        assert_eq!(entity.position().column, 3);
        entity.rewind(1);
        assert_eq!(entity.position().offset, 1);
        assert_eq!(entity.read().unwrap(), Some('b'));
        assert_eq!(entity.read().unwrap(), None);
    }

    #[test]
    fn test_skip_newlines_counts_crlf_once() {
        let mut entity = text("\r\n\n\rx");
        assert_eq!(entity.skip_newlines().unwrap(), 3);
        let position = entity.position();
        assert_eq!((position.line, position.column, position.offset), (4, 1, 4));
        assert_eq!(entity.read().unwrap(), Some('x'));
    }

    #[test]
    fn test_peek_and_mark_do_not_consume() {
        let mut entity = text("</script>");
        assert_eq!(entity.next_content(3).unwrap(), "</s");
        let mark = entity.mark();
        while entity.read().unwrap().is_some() {}
        entity.reset(mark);
        assert_eq!(entity.read().unwrap(), Some('<'));
    }

    #[test]
    fn test_long_input_survives_compaction() {
        let input = "x".repeat(COMPACT_AT * 3);
        let mut entity = text(&input);
        let mut count = 0;
        while entity.read().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, input.len());
        assert_eq!(entity.position().offset, input.len());
    }

    #[test]
    fn test_replay_redecodes_bytes() {
        let stream = PlaybackStream::new(Cursor::new(vec![b'a', 0xE9]));
        let mut entity = CurrentEntity::from_bytes(stream, UTF_8, SourceInfo::default());
        assert_eq!(entity.read().unwrap(), Some('a'));
        assert_eq!(entity.read().unwrap(), Some('\u{FFFD}'));
        assert!(entity.replay_with(WINDOWS_1252));
        assert_eq!(entity.read().unwrap(), Some('a'));
        assert_eq!(entity.read().unwrap(), Some('é'));
        assert_eq!(entity.read().unwrap(), None);
    }

    #[test]
    fn test_expand_system_id() {
        assert_eq!(
            expand_system_id(Some("b.html"), Some("http://x.org/dir/a.html")).as_deref(),
            Some("http://x.org/dir/b.html")
        );
        assert_eq!(expand_system_id(None, Some("base")), None);
    }
}
