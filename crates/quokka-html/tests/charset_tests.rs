//! Integration tests for encoding detection and charset replays.

use std::rc::Rc;

use quokka_common::CollectingReporter;
use quokka_html::{HtmlScanner, InputSource, ScanEvent, ScannerConfig};

/// Result of scanning one byte document.
struct Scanned {
    events: Vec<ScanEvent>,
    encoding: String,
    keys: Vec<&'static str>,
}

impl Scanned {
    /// Concatenated character data.
    fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|event| match event {
                ScanEvent::Characters { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Element names of start, empty and end events.
    fn names(&self) -> Vec<&str> {
        self.events.iter().filter_map(ScanEvent::element_name).collect()
    }
}

/// Helper to scan `source` with error reporting on.
fn scan_source(config: ScannerConfig, source: InputSource) -> Scanned {
    let reporter = Rc::new(CollectingReporter::new());
    let config = ScannerConfig {
        report_errors: true,
        ..config
    };
    let mut scanner = HtmlScanner::with_reporter(config, reporter.clone());
    scanner.set_input_source(source).unwrap();
    let events = scanner.by_ref().collect::<Result<_, _>>().unwrap();
    Scanned {
        events,
        encoding: scanner.encoding().to_string(),
        keys: reporter.keys(),
    }
}

/// Helper to scan `bytes` whose default encoding is `default_encoding`.
fn scan_bytes(default_encoding: &str, bytes: &[u8]) -> Scanned {
    let config = ScannerConfig {
        default_encoding: default_encoding.to_string(),
        ..ScannerConfig::default()
    };
    scan_source(config, InputSource::from_bytes(bytes))
}

const LATIN1_PAGE: &[u8] = b"<html><head><meta http-equiv=\"Content-Type\" \
content=\"text/html; charset=ISO-8859-1\"></head><body>caf\xE9</body></html>";

// =============================================================================
// Byte order marks and defaults
// =============================================================================

#[test]
fn test_default_encoding_is_reported() {
    let scanned = scan_bytes("Windows-1252", b"<p>caf\xE9 \x93q\x94");
    assert_eq!(scanned.text(), "caf\u{e9} \u{201c}q\u{201d}");
    assert_eq!(scanned.keys, ["HTML1000"]);
}

#[test]
fn test_utf8_byte_order_mark() {
    let scanned = scan_bytes("Windows-1252", "\u{feff}<p>caf\u{e9}".as_bytes());
    assert_eq!(scanned.text(), "caf\u{e9}");
    assert_eq!(scanned.encoding, "UTF-8");
    assert!(scanned.keys.is_empty());
}

#[test]
fn test_utf16_byte_order_mark() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "<p>hi</p>".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let scanned = scan_bytes("Windows-1252", &bytes);
    assert_eq!(scanned.names(), ["p", "p"]);
    assert_eq!(scanned.text(), "hi");
    assert_eq!(scanned.encoding, "UTF-16LE");
}

#[test]
fn test_declared_encoding_wins() {
    let source = InputSource::from_bytes(b"<p>\xB1".to_vec()).with_encoding("ISO-8859-2");
    let scanned = scan_source(ScannerConfig::default(), source);
    assert_eq!(scanned.text(), "\u{105}");
    assert_eq!(scanned.encoding, "ISO-8859-2");
    assert!(scanned.keys.is_empty());
}

#[test]
fn test_text_input_is_never_sniffed() {
    let reporter = Rc::new(CollectingReporter::new());
    let config = ScannerConfig {
        report_errors: true,
        ..ScannerConfig::default()
    };
    let mut scanner = HtmlScanner::with_reporter(config, reporter.clone());
    scanner
        .set_input_source(InputSource::from_text("<meta charset=\"UTF-16\">x"))
        .unwrap();
    let events: Vec<_> = scanner.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(events.len(), 4);
    assert!(reporter.keys().is_empty());
}

// =============================================================================
// Charset replays
// =============================================================================

#[test]
fn test_meta_charset_replays_the_head() {
    let scanned = scan_bytes("UTF-8", LATIN1_PAGE);
    assert_eq!(scanned.text(), "caf\u{e9}");
    assert_eq!(scanned.encoding, "ISO-8859-1");
    assert_eq!(
        scanned.names(),
        ["html", "head", "meta", "head", "body", "body", "html"]
    );
    let starts = scanned
        .events
        .iter()
        .filter(|event| matches!(event, ScanEvent::StartDocument { .. }))
        .count();
    assert_eq!(starts, 1);
}

#[test]
fn test_meta_charset_attribute() {
    let scanned = scan_bytes("UTF-8", b"<meta charset=\"windows-1252\"><p>\x80");
    assert_eq!(scanned.text(), "\u{20ac}");
    assert_eq!(scanned.encoding, "windows-1252");
    assert_eq!(scanned.names(), ["meta", "p"]);
}

#[test]
fn test_xml_declaration_replays_once() {
    let scanned = scan_bytes(
        "UTF-8",
        b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><p>caf\xE9",
    );
    assert_eq!(scanned.text(), "caf\u{e9}");
    let declarations = scanned
        .events
        .iter()
        .filter(|event| matches!(event, ScanEvent::XmlDecl { .. }))
        .count();
    assert_eq!(declarations, 1);
    assert_eq!(scanned.names(), ["p"]);
}

#[test]
fn test_same_charset_does_not_replay() {
    let scanned = scan_bytes("UTF-8", "<meta charset=\"utf-8\"><p>caf\u{e9}".as_bytes());
    assert_eq!(scanned.text(), "caf\u{e9}");
    assert_eq!(scanned.names(), ["meta", "p"]);
}

#[test]
fn test_ignore_specified_charset() {
    let config = ScannerConfig {
        default_encoding: "UTF-8".to_string(),
        ignore_specified_charset: true,
        ..ScannerConfig::default()
    };
    let scanned = scan_source(config, InputSource::from_bytes(LATIN1_PAGE));
    assert_eq!(scanned.text(), "caf\u{fffd}");
    assert_eq!(scanned.encoding, "UTF-8");
}

#[test]
fn test_meta_in_body_is_ignored() {
    let scanned = scan_bytes("UTF-8", b"<body><meta charset=\"ISO-8859-1\">caf\xE9");
    assert_eq!(scanned.text(), "caf\u{fffd}");
    assert_eq!(scanned.encoding, "UTF-8");
}

// =============================================================================
// Rejected charsets
// =============================================================================

#[test]
fn test_unknown_charset_is_reported() {
    let scanned = scan_bytes("UTF-8", b"<meta charset=\"x-bogus\"><p>ok");
    assert_eq!(scanned.text(), "ok");
    assert_eq!(scanned.encoding, "UTF-8");
    assert!(scanned.keys.contains(&"HTML1001"));
    assert!(scanned.keys.contains(&"HTML1010"));
}

#[test]
fn test_incompatible_charset_is_reported() {
    let scanned = scan_bytes("Windows-1252", b"<meta charset=\"UTF-16\"><p>ok");
    assert_eq!(scanned.text(), "ok");
    assert_eq!(scanned.encoding, "Windows-1252");
    assert!(scanned.keys.contains(&"HTML1015"));
}
