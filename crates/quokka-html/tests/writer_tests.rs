//! Integration tests for the HTML writer and the element filter.

use std::fmt;

use quokka_html::filter::ElementRemover;
use quokka_html::{EventSink, HtmlParser, HtmlWriter, ParserConfig};

/// Helper to parse `html` and print it with `encoding` in content-type metas.
fn rewrite(parser: &HtmlParser, html: &str, encoding: &str) -> String {
    let mut writer = HtmlWriter::new(String::new(), encoding);
    parser.parse_str(html, &mut writer).unwrap();
    writer.finish().unwrap()
}

/// Helper to filter `html` through `remover` and print what is left.
fn filter(html: &str, configure: impl FnOnce(&mut ElementRemover<HtmlWriter<String>>)) -> String {
    let mut remover = ElementRemover::new(HtmlWriter::new(String::new(), "UTF-8"));
    configure(&mut remover);
    HtmlParser::default().parse_str(html, &mut remover).unwrap();
    remover.into_inner().finish().unwrap()
}

/// Output that refuses every write.
struct Refusing;

impl fmt::Write for Refusing {
    fn write_str(&mut self, _s: &str) -> fmt::Result {
        Err(fmt::Error)
    }
}

// =============================================================================
// Writer
// =============================================================================

#[test]
fn test_content_type_meta_is_rewritten() {
    let html = "<html><head><meta http-equiv=\"Content-Type\" \
                content=\"text/html; charset=ISO-8859-1\"><title>a<b</title></head>\
                <body><p class=\"a\">1 &lt; 2</p></body></html>";
    assert_eq!(
        rewrite(&HtmlParser::default(), html, "UTF-8"),
        "<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\">\
         <title>a<b</title></head><body><p class=\"a\">1 &lt; 2</p></body></html>"
    );
}

#[test]
fn test_entity_events_print_references() {
    let mut config = ParserConfig::default();
    config.scanner.notify_html_builtin_refs = true;
    config.scanner.notify_char_refs = true;
    let parser = HtmlParser::new(config);
    assert_eq!(
        rewrite(&parser, "&copy;&#169;&#65;", "UTF-8"),
        "<html><head></head><body>&copy;&copy;&#65;</body></html>"
    );
}

#[test]
fn test_non_ascii_text_is_escaped() {
    assert_eq!(
        rewrite(&HtmlParser::default(), "<p>caf\u{e9} \u{a0}\n", "UTF-8"),
        "<html><head></head><body><p>caf&eacute; &nbsp;\n</p></body></html>"
    );
}

#[test]
fn test_declarations() {
    let mut writer = HtmlWriter::new(String::new(), "UTF-8");
    writer.doctype(
        Some("html".to_string()),
        None,
        Some("about:legacy-compat".to_string()),
        None,
    );
    writer.processing_instruction("php".to_string(), "x".to_string(), None);
    writer.start_element("html".to_string(), Vec::new(), None);
    writer.end_element("html".to_string(), None);
    writer.comment("after".to_string(), None);
    assert_eq!(
        writer.finish().unwrap(),
        "<!DOCTYPE html SYSTEM \"about:legacy-compat\">\n<?php x><html></html>\n<!--after-->"
    );
}

#[test]
fn test_write_errors_surface_on_finish() {
    let mut writer = HtmlWriter::new(Refusing, "UTF-8");
    writer.start_element("p".to_string(), Vec::new(), None);
    writer.characters("x".to_string(), None);
    assert!(writer.finish().is_err());
}

// =============================================================================
// Element filter
// =============================================================================

#[test]
fn test_filter_accepts_removes_and_unwraps() {
    let html = "<p onclick=\"x()\">a<b>b</b><script>s()</script>\
                <a href=\"/\" target=_blank>l</a><span>c</span></p>";
    let output = filter(html, |remover| {
        remover.accept_element("p", &[]);
        remover.accept_element("b", &[]);
        remover.accept_element("a", &["href"]);
        remover.remove_element("script");
    });
    assert_eq!(output, "<p>a<b>b</b><a href=\"/\">l</a>c</p>");
}

#[test]
fn test_removed_empty_element_does_not_swallow_content() {
    let output = filter("<p>a<img src=x>b</p>", |remover| {
        remover.accept_element("p", &[]);
        remover.remove_element("img");
    });
    assert_eq!(output, "<p>ab</p>");
}

#[test]
fn test_removed_element_nested_in_removed_element() {
    let output = filter("<div>a<object><embed><p>b</p></object>c</div>", |remover| {
        remover.remove_element("object");
        remover.remove_element("p");
    });
    assert_eq!(output, "ac");
}
