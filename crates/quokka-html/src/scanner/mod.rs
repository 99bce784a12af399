//! Tolerant HTML scanner.
//!
//! [`HtmlScanner`] turns a byte or text source into a flat stream of
//! [`ScanEvent`]s. It never rejects markup: stray brackets become text,
//! unterminated constructs run to the end of input, and every repair is
//! reported through an [`ErrorReporter`].
//!
//! The scanner is pull-based. [`HtmlScanner::next_event`] scans until at least
//! one event is ready; [`HtmlScanner::scan_document`] drives a whole document
//! into an [`EventSink`].
//!
//! # Encoding
//!
//! Byte input is decoded with the declared encoding, else the one named by a
//! byte order mark, else the configured default. Until `<body>` (or any
//! element that belongs in the body) is seen, every byte is recorded. A
//! `<meta>` or `<?xml?>` charset that reads the document head the same way
//! restarts decoding from the first byte; events already delivered are not
//! delivered twice.

/// Character reference and markup scanning in the content state.
mod content;
/// Decoded character window over one source.
pub mod entity;
/// Low-level character helpers.
mod helpers;
/// Input source description.
pub mod input;
/// Recording byte stream for charset replays.
pub mod playback;
/// Raw-text scanning inside STYLE, TEXTAREA, TITLE and friends.
mod special;

use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::rc::Rc;

use encoding_rs::{Encoding, WINDOWS_1252};
use quokka_common::{ErrorReporter, WarnOnceReporter};

use crate::config::ScannerConfig;
use crate::error::{Error, Result};
use crate::event::{Location, Position, ScanEvent};
use crate::messages::MessageKey;
use crate::sink::{EventSink, dispatch};

pub use entity::{CurrentEntity, SourceInfo};
pub use input::{InputData, InputSource};
pub use playback::PlaybackStream;

pub(crate) use helpers::is_space;

use special::SpecialElement;

/// Component name used in diagnostics.
const COMPONENT: &str = "Scanner";

/// Text both encodings of a charset switch must read identically.
const ENCODING_PROBE: &str =
    "<html><head><meta http-equiv=\"Content-Type\" content=\"text/html;charset=";

/// Where the scanner is within the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    /// Nothing scanned yet.
    StartDocument,
    /// Between markup.
    Content,
    /// Just after `<`.
    MarkupBracket,
    /// Input exhausted; the end event is next.
    EndDocument,
    /// Finished, or no input set.
    Done,
}

/// Outcome of one scanning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scan {
    /// Keep scanning the current entity.
    More,
    /// The current entity ran out.
    Eof,
}

/// Streaming HTML scanner.
pub struct HtmlScanner {
    config: ScannerConfig,
    reporter: Rc<dyn ErrorReporter>,
    entity: CurrentEntity,
    entity_stack: Vec<CurrentEntity>,
    state: ScannerState,
    special: Option<SpecialElement>,
    pending: VecDeque<ScanEvent>,
    /// Start tags scanned since the document (or the last replay) began.
    element_count: usize,
    /// Set after a charset replay: events are held back until `element_count`
    /// reaches this value again.
    replay_depth: Option<usize>,
    encoding: &'static Encoding,
    encoding_label: String,
    iso8859: bool,
    /// The top-level source is a byte stream that is still being recorded.
    byte_stream_active: bool,
    begin: Position,
}

impl fmt::Debug for HtmlScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlScanner")
            .field("state", &self.state)
            .field("encoding", &self.encoding_label)
            .field("element_count", &self.element_count)
            .field("replay_depth", &self.replay_depth)
            .field("pushed_sources", &self.entity_stack.len())
            .finish_non_exhaustive()
    }
}

impl HtmlScanner {
    /// Create a scanner that prints diagnostics through the shared warning
    /// facility.
    #[must_use]
    pub fn new(config: ScannerConfig) -> Self {
        Self::with_reporter(config, Rc::new(WarnOnceReporter))
    }

    /// Create a scanner that sends diagnostics to `reporter`.
    #[must_use]
    pub fn with_reporter(config: ScannerConfig, reporter: Rc<dyn ErrorReporter>) -> Self {
        let encoding_label = config.default_encoding.clone();
        let encoding = Encoding::for_label(encoding_label.as_bytes()).unwrap_or(WINDOWS_1252);
        Self {
            config,
            reporter,
            entity: CurrentEntity::empty(),
            entity_stack: Vec::new(),
            state: ScannerState::Done,
            special: None,
            pending: VecDeque::new(),
            element_count: 0,
            replay_depth: None,
            encoding,
            encoding_label,
            iso8859: true,
            byte_stream_active: false,
            begin: Position::START,
        }
    }

    /// Replace the diagnostics receiver.
    pub fn set_reporter(&mut self, reporter: Rc<dyn ErrorReporter>) {
        self.reporter = reporter;
    }

    /// Settings in effect.
    #[must_use]
    pub const fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ScannerState {
        self.state
    }

    /// Label of the encoding the top-level source is decoded with.
    #[must_use]
    pub fn encoding(&self) -> &str {
        &self.encoding_label
    }

    /// Identifiers of the entity being scanned.
    #[must_use]
    pub const fn source_info(&self) -> &SourceInfo {
        self.entity.info()
    }

    /// Position in the entity being scanned.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.entity.position()
    }

    /// Start scanning a new document, discarding any previous one.
    ///
    /// # Errors
    /// Fails when reading the first bytes fails, or when the source declares
    /// an encoding no decoder supports.
    pub fn set_input_source(&mut self, source: InputSource) -> Result<()> {
        self.element_count = 0;
        self.replay_depth = None;
        self.byte_stream_active = false;
        self.entity_stack.clear();
        self.pending.clear();
        self.special = None;
        self.begin = Position::START;
        self.state = ScannerState::Done;

        self.encoding_label = self.config.default_encoding.clone();
        self.encoding =
            Encoding::for_label(self.encoding_label.as_bytes()).unwrap_or(WINDOWS_1252);

        let info = source_info(&source);
        self.entity = match source.data {
            InputData::Text(text) => {
                let label = source.encoding.unwrap_or_else(|| self.encoding_label.clone());
                self.iso8859 = is_iso8859(&label, &self.config.default_encoding);
                CurrentEntity::from_text(&text, SourceInfo {
                    encoding: Some(label),
                    ..info
                })
            }
            InputData::Bytes(reader) => {
                let mut stream = PlaybackStream::new(reader);
                let label = match source.encoding {
                    Some(label) => label,
                    None => match stream.detect_encoding()? {
                        Some(encoding) => encoding.name().to_string(),
                        None => {
                            self.report(MessageKey::EncodingNotSpecified, &[]);
                            self.config.default_encoding.clone()
                        }
                    },
                };
                let Some(encoding) = Encoding::for_label(label.trim().as_bytes()) else {
                    self.report(MessageKey::UnsupportedEncodingName, &[&label]);
                    return Err(Error::UnsupportedEncoding(label));
                };
                log::debug!(target: "quokka::scanner", "decoding input as {}", encoding.name());
                self.iso8859 = is_iso8859(&label, &self.config.default_encoding);
                self.encoding = encoding;
                self.encoding_label.clone_from(&label);
                self.byte_stream_active = true;
                CurrentEntity::from_bytes(stream, encoding, SourceInfo {
                    encoding: Some(label),
                    ..info
                })
            }
        };
        self.state = ScannerState::StartDocument;
        Ok(())
    }

    /// Scan `source` next; the current entity resumes at its end.
    pub fn push_input_source(&mut self, source: InputSource) {
        let entity = self.nested_entity(source);
        self.entity_stack.push(mem::replace(&mut self.entity, entity));
        log::trace!(target: "quokka::scanner", "pushed input source ({} deep)", self.entity_stack.len());
    }

    /// Scan `source` to its end right now, then continue where scanning left
    /// off. The events it produces are delivered before anything that follows
    /// in the current source.
    ///
    /// # Errors
    /// Propagates read failures from `source`; the previous state is restored
    /// either way.
    pub fn evaluate_input_source(&mut self, source: InputSource) -> Result<()> {
        let entity = self.nested_entity(source);
        let previous_entity = mem::replace(&mut self.entity, entity);
        let previous_stack = mem::take(&mut self.entity_stack);
        let previous_state = mem::replace(&mut self.state, ScannerState::Content);
        let previous_special = self.special.take();

        let result = self.scan_until_end();

        self.entity = previous_entity;
        self.entity_stack = previous_stack;
        self.state = previous_state;
        self.special = previous_special;
        result
    }

    fn scan_until_end(&mut self) -> Result<()> {
        while self.state != ScannerState::EndDocument {
            self.scan_step()?;
        }
        Ok(())
    }

    /// Release pushed sources.
    ///
    /// With `close_all`, the original source is released too and scanning
    /// ends at the next step. Otherwise scanning continues in the original
    /// source.
    pub fn cleanup(&mut self, close_all: bool) {
        if close_all {
            self.entity_stack.clear();
            self.entity = CurrentEntity::empty();
            self.special = None;
            return;
        }
        if !self.entity_stack.is_empty() {
            let original = self.entity_stack.swap_remove(0);
            self.entity_stack.clear();
            self.entity = original;
        }
    }

    fn nested_entity(&self, source: InputSource) -> CurrentEntity {
        let info = source_info(&source);
        match source.data {
            InputData::Text(text) => CurrentEntity::from_text(&text, SourceInfo {
                encoding: source.encoding,
                ..info
            }),
            InputData::Bytes(reader) => {
                let encoding = source
                    .encoding
                    .as_deref()
                    .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
                    .unwrap_or(self.encoding);
                let mut stream = PlaybackStream::new(reader);
                stream.clear();
                CurrentEntity::from_bytes(stream, encoding, SourceInfo {
                    encoding: Some(encoding.name().to_string()),
                    ..info
                })
            }
        }
    }

    /// Scan until the next event is available.
    ///
    /// Returns `Ok(None)` once the end of the document has been delivered.
    ///
    /// # Errors
    /// Only I/O failures of the byte source; scanning stops after one.
    pub fn next_event(&mut self) -> Result<Option<ScanEvent>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            if self.state == ScannerState::Done {
                return Ok(None);
            }
            if let Err(error) = self.scan_step() {
                self.state = ScannerState::Done;
                return Err(error);
            }
        }
    }

    /// Scan the whole document into `sink`.
    ///
    /// # Errors
    /// Only I/O failures of the byte source.
    pub fn scan_document<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        while let Some(event) = self.next_event()? {
            dispatch(sink, event);
        }
        Ok(())
    }

    fn scan_step(&mut self) -> Result<()> {
        match self.state {
            ScannerState::StartDocument => {
                self.begin = self.entity.position();
                self.emit(ScanEvent::StartDocument {
                    location: self.location(),
                });
                if self.config.insert_doctype {
                    let root = self.config.names_elems.apply("HTML");
                    self.emit(ScanEvent::Doctype {
                        root: Some(root),
                        public_id: Some(self.config.doctype_public_id.clone()),
                        system_id: Some(self.config.doctype_system_id.clone()),
                        location: self.synthesized_location(),
                    });
                }
                self.state = ScannerState::Content;
            }
            ScannerState::Content => {
                let scan = if self.special.is_some() {
                    self.scan_special_content()?
                } else {
                    self.scan_content()?
                };
                if scan == Scan::Eof {
                    self.handle_eof();
                }
            }
            ScannerState::MarkupBracket => {
                let scan = if self.special.is_some() {
                    self.scan_special_bracket()?
                } else {
                    self.scan_markup_bracket()?
                };
                if scan == Scan::Eof {
                    self.handle_eof();
                }
            }
            ScannerState::EndDocument => {
                self.begin = self.entity.position();
                self.emit(ScanEvent::EndDocument {
                    location: self.location(),
                });
                self.state = ScannerState::Done;
            }
            ScannerState::Done => {}
        }
        Ok(())
    }

    fn handle_eof(&mut self) {
        self.special = None;
        if let Some(entity) = self.entity_stack.pop() {
            log::trace!(target: "quokka::scanner", "pushed source exhausted, resuming outer source");
            self.entity = entity;
            self.state = ScannerState::Content;
        } else {
            self.state = ScannerState::EndDocument;
        }
    }

    // =========================================================================
    // Event emission
    // =========================================================================

    /// Queue an event unless a charset replay is still catching up.
    pub(crate) fn emit(&mut self, event: ScanEvent) {
        if self
            .replay_depth
            .is_none_or(|depth| self.element_count >= depth)
        {
            self.pending.push_back(event);
        }
    }

    pub(crate) fn emit_characters(&mut self, text: String) {
        let location = self.location();
        self.emit(ScanEvent::Characters { text, location });
    }

    /// Span from the start of the current construct to the read position.
    pub(crate) fn location(&self) -> Option<Location> {
        self.config
            .augmentations
            .then(|| Location::span(self.begin, self.entity.position()))
    }

    fn synthesized_location(&self) -> Option<Location> {
        self.config.augmentations.then(Location::synthesized)
    }

    pub(crate) fn report(&self, key: MessageKey, args: &[&str]) {
        log::trace!(target: "quokka::scanner", "{key} {args:?} at {:?}", self.entity.position());
        if self.config.report_errors {
            self.reporter.report(key.diagnostic(COMPONENT, args));
        }
    }

    // =========================================================================
    // Charset switching
    // =========================================================================

    /// Whether a `<meta>` or `<?xml?>` charset may still restart decoding.
    pub(crate) fn can_sniff_charset(&self) -> bool {
        self.byte_stream_active && self.replay_depth.is_none() && self.entity_stack.is_empty()
    }

    /// Stop recording the top-level byte stream.
    pub(crate) fn clear_playback(&mut self) {
        if self.byte_stream_active {
            log::trace!(target: "quokka::scanner", "encoding settled on {}", self.encoding.name());
            self.byte_stream_active = false;
            self.entity.clear_playback();
        }
    }

    /// Restart decoding with `charset` if it is known and compatible.
    ///
    /// Returns `true` when the stream is being replayed.
    pub(crate) fn change_encoding(&mut self, charset: &str) -> bool {
        if !self.can_sniff_charset() {
            return false;
        }
        let label = charset.trim();
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            self.report(MessageKey::UnsupportedEncodingName, &[label]);
            self.report(MessageKey::UnsupportedCharset, &[label]);
            self.clear_playback();
            return false;
        };
        if encoding == self.encoding {
            return false;
        }
        if !encodings_compatible(encoding, self.encoding) {
            self.report(MessageKey::IncompatibleEncodingChange, &[
                encoding.name(),
                self.encoding.name(),
            ]);
            return false;
        }
        if !self.entity.replay_with(encoding) {
            return false;
        }
        log::debug!(
            target: "quokka::scanner",
            "charset {label} replaces {}, replaying input",
            self.encoding.name()
        );
        self.iso8859 = is_iso8859(label, &self.config.default_encoding);
        self.encoding = encoding;
        self.encoding_label = label.to_string();
        self.replay_depth = Some(self.element_count);
        self.element_count = 0;
        true
    }
}

impl Iterator for HtmlScanner {
    type Item = Result<ScanEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

fn source_info(source: &InputSource) -> SourceInfo {
    SourceInfo {
        encoding: None,
        public_id: source.public_id.clone(),
        base_system_id: source.base_system_id.clone(),
        literal_system_id: source.system_id.clone(),
        expanded_system_id: entity::expand_system_id(
            source.system_id.as_deref(),
            source.base_system_id.as_deref(),
        ),
    }
}

/// Windows-1252 remapping of numeric references applies to these labels.
fn is_iso8859(label: &str, default_label: &str) -> bool {
    label.to_ascii_uppercase().starts_with("ISO-8859") || label.eq_ignore_ascii_case(default_label)
}

/// Whether text encoded as `next` reads back the same through `current`.
fn encodings_compatible(next: &'static Encoding, current: &'static Encoding) -> bool {
    if next.output_encoding() != next {
        return false;
    }
    let (bytes, _, unmappable) = next.encode(ENCODING_PROBE);
    if unmappable {
        return false;
    }
    let (text, malformed) = current.decode_without_bom_handling(&bytes);
    !malformed && text == ENCODING_PROBE
}

#[cfg(test)]
mod tests {
    use encoding_rs::{ISO_8859_2, UTF_8, UTF_16LE};

    use super::*;

    #[test]
    fn test_ascii_supersets_are_compatible() {
        assert!(encodings_compatible(ISO_8859_2, WINDOWS_1252));
        assert!(encodings_compatible(UTF_8, WINDOWS_1252));
        assert!(!encodings_compatible(UTF_16LE, UTF_8));
        assert!(!encodings_compatible(UTF_8, UTF_16LE));
    }

    #[test]
    fn test_iso8859_labels() {
        assert!(is_iso8859("iso-8859-15", "Windows-1252"));
        assert!(is_iso8859("windows-1252", "Windows-1252"));
        assert!(!is_iso8859("UTF-8", "Windows-1252"));
    }

    #[test]
    fn test_no_events_without_input() {
        let mut scanner = HtmlScanner::new(ScannerConfig::default());
        assert!(scanner.next_event().unwrap().is_none());
    }
}
