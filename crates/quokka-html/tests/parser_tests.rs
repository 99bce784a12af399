//! Integration tests for the scan-and-balance pipeline.

use std::cell::RefCell;
use std::io::{self, Read};
use std::rc::Rc;

use quokka_html::{
    Error, EventCollector, HtmlParser, HtmlWriter, IgnoredTags, InputSource, ParserConfig,
    ScanEvent,
};

/// Helper to run `parser` over `html` and print the result.
fn print(parser: &HtmlParser, html: &str) -> String {
    let mut writer = HtmlWriter::new(String::new(), "UTF-8");
    parser.parse_str(html, &mut writer).unwrap();
    writer.finish().unwrap()
}

/// Reader that fails on first use.
struct BrokenReader;

impl Read for BrokenReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("disk on fire"))
    }
}

#[test]
fn test_parse_bytes_uses_default_encoding() {
    let mut writer = HtmlWriter::new(String::new(), "UTF-8");
    HtmlParser::default().parse_bytes(b"<p>caf\xE9", &mut writer).unwrap();
    assert_eq!(
        writer.finish().unwrap(),
        "<html><head></head><body><p>caf&eacute;</p></body></html>"
    );
}

#[test]
fn test_unbalanced_parsing() {
    let config = ParserConfig {
        balance_tags: false,
        ..ParserConfig::default()
    };
    assert_eq!(print(&HtmlParser::new(config), "<b>x</i>"), "<b>x</i>");
}

#[test]
fn test_fragment_parsing_always_balances() {
    let config = ParserConfig {
        balance_tags: false,
        ..ParserConfig::default()
    };
    let mut writer = HtmlWriter::new(String::new(), "UTF-8");
    HtmlParser::new(config)
        .parse_fragment(InputSource::from_text("<td>a<td>b"), &["table", "tbody", "tr"], &mut writer)
        .unwrap();
    assert_eq!(writer.finish().unwrap(), "<td>a</td><td>b</td>");
}

#[test]
fn test_config_from_json() {
    let mut config: ParserConfig =
        serde_json::from_str(r#"{"scanner": {"names_elems": "upper"}}"#).unwrap();
    assert!(config.balance_tags);
    config.sync_shared();
    assert_eq!(
        print(&HtmlParser::new(config), "<p>x"),
        "<HTML><HEAD></HEAD><BODY><P>x</P></BODY></HTML>"
    );
}

#[test]
fn test_synthesized_locations() {
    let parser = HtmlParser::new(ParserConfig::default().with_augmentations(true));
    let events: Vec<_> = parser
        .events(InputSource::from_text("x"))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let html = events
        .iter()
        .find(|event| event.element_name() == Some("html"))
        .and_then(ScanEvent::location)
        .unwrap();
    assert!(html.synthesized);

    let text = events
        .iter()
        .find(|event| matches!(event, ScanEvent::Characters { .. }))
        .and_then(ScanEvent::location)
        .unwrap();
    assert!(!text.synthesized);
    assert_eq!((text.begin_offset, text.end_offset), (0, 1));
}

#[test]
fn test_listener_is_shared_across_parses() {
    let listener = Rc::new(RefCell::new(IgnoredTags::new()));
    let parser = HtmlParser::default().with_listener(listener.clone());
    let mut collector = EventCollector::new();
    parser.parse_str("</x>", &mut collector).unwrap();
    parser.parse_str("<html><html>", &mut collector).unwrap();
    assert_eq!(listener.borrow().rendered(), ["</x>", "<html>"]);
}

#[test]
fn test_unsupported_encoding_fails() {
    let source = InputSource::from_bytes(b"<p>".to_vec()).with_encoding("no-such-charset");
    let result = HtmlParser::default().parse(source, &mut EventCollector::new());
    assert!(matches!(result, Err(Error::UnsupportedEncoding(_))));
}

#[test]
fn test_read_errors_fail_the_parse() {
    let result = HtmlParser::default().parse(
        InputSource::from_reader(BrokenReader),
        &mut EventCollector::new(),
    );
    assert!(matches!(result, Err(Error::Io(_))));
}
