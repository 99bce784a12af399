//! Integration tests for the HTML scanner.
//!
//! Events are compared in the line notation of `ScanEvent`'s `Display`
//! implementation, without the document start and end markers.

use std::rc::Rc;

use quokka_common::CollectingReporter;
use quokka_html::{
    Error, EventCollector, HtmlScanner, InputSource, NameCase, ScanEvent, ScannerConfig,
};

/// Helper to scan `html` with `config` into a list of events.
fn scan_with(config: ScannerConfig, html: &str) -> Vec<ScanEvent> {
    let mut scanner = HtmlScanner::new(config);
    scanner.set_input_source(InputSource::from_text(html)).unwrap();
    scanner.collect::<Result<_, _>>().unwrap()
}

/// Helper to scan `html` with default settings.
fn scan(html: &str) -> Vec<ScanEvent> {
    scan_with(ScannerConfig::default(), html)
}

/// Helper to render events in line notation, dropping the document markers.
fn notation(events: &[ScanEvent]) -> Vec<String> {
    events
        .iter()
        .filter(|event| {
            !matches!(
                event,
                ScanEvent::StartDocument { .. } | ScanEvent::EndDocument { .. }
            )
        })
        .map(ToString::to_string)
        .collect()
}

/// Helper to concatenate the character data of `events`.
fn text(events: &[ScanEvent]) -> String {
    events
        .iter()
        .filter_map(|event| match event {
            ScanEvent::Characters { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

/// Helper to scan with error reporting into a collecting reporter.
fn scan_reporting(config: ScannerConfig, html: &str) -> (Vec<ScanEvent>, Vec<&'static str>) {
    let reporter = Rc::new(CollectingReporter::new());
    let config = ScannerConfig {
        report_errors: true,
        ..config
    };
    let mut scanner = HtmlScanner::with_reporter(config, reporter.clone());
    scanner.set_input_source(InputSource::from_text(html)).unwrap();
    let events = scanner.collect::<Result<_, _>>().unwrap();
    (events, reporter.keys())
}

// =============================================================================
// Document structure
// =============================================================================

#[test]
fn test_document_brackets() {
    let events = scan("");
    assert!(matches!(events[0], ScanEvent::StartDocument { .. }));
    assert!(matches!(events[1], ScanEvent::EndDocument { .. }));
    assert_eq!(events.len(), 2);
}

#[test]
fn test_scanner_does_not_balance() {
    assert_eq!(notation(&scan("<b><i>x</b>")), ["(b", "(i", "\"x", ")b"]);
}

// =============================================================================
// Tags and attributes
// =============================================================================

#[test]
fn test_start_tag_attributes() {
    let events = scan("<div class=x id='y' hidden>");
    let ScanEvent::StartElement {
        name, attributes, ..
    } = &events[1]
    else {
        panic!("expected a start tag, got {:?}", events[1]);
    };
    assert_eq!(name, "div");
    let pairs: Vec<_> = attributes
        .iter()
        .map(|attr| (attr.name.as_str(), attr.value.as_str()))
        .collect();
    assert_eq!(pairs, [("class", "x"), ("id", "y"), ("hidden", "")]);
}

#[test]
fn test_name_casing() {
    let html = "<DIV Class=a></DIV>";
    assert_eq!(notation(&scan(html)), ["(div\nAclass a", ")div"]);

    let upper = ScannerConfig {
        names_elems: NameCase::Upper,
        names_attrs: NameCase::Upper,
        ..ScannerConfig::default()
    };
    assert_eq!(notation(&scan_with(upper, html)), ["(DIV\nACLASS a", ")DIV"]);

    let kept = ScannerConfig {
        names_elems: NameCase::Default,
        names_attrs: NameCase::Default,
        ..ScannerConfig::default()
    };
    assert_eq!(notation(&scan_with(kept, html)), ["(DIV\nAClass a", ")DIV"]);
}

#[test]
fn test_self_closing_tags() {
    assert_eq!(notation(&scan("<br/><p/>")), ["(br\n)br", "(p\n)p"]);
}

#[test]
fn test_end_tag_junk_is_skipped() {
    assert_eq!(notation(&scan("<p>x</p junk>")), ["(p", "\"x", ")p"]);
}

#[test]
fn test_attribute_references() {
    let events = scan("<a href=\"?a=1&copy=2&lang=en&amp;x\">");
    let ScanEvent::StartElement { attributes, .. } = &events[1] else {
        panic!("expected a start tag, got {:?}", events[1]);
    };
    assert_eq!(attributes[0].value, "?a=1\u{a9}=2&lang=en&x");
    assert_eq!(attributes[0].non_normalized_value, "?a=1&copy=2&lang=en&amp;x");
}

#[test]
fn test_normalize_attributes() {
    let config = ScannerConfig {
        normalize_attributes: true,
        ..ScannerConfig::default()
    };
    let events = scan_with(config, "<a title=\"  a \n  b  \">");
    let ScanEvent::StartElement { attributes, .. } = &events[1] else {
        panic!("expected a start tag, got {:?}", events[1]);
    };
    assert_eq!(attributes[0].value, "a b");
    assert_eq!(attributes[0].non_normalized_value, "  a \n  b  ");
}

// =============================================================================
// Stray brackets
// =============================================================================

#[test]
fn test_stray_brackets_become_text() {
    let (events, keys) = scan_reporting(ScannerConfig::default(), "a < b");
    assert_eq!(text(&events), "a < b");
    assert_eq!(keys, ["HTML1009"]);

    assert_eq!(text(&scan("<1>")), "<1>");
}

#[test]
fn test_trailing_bracket() {
    let (events, keys) = scan_reporting(ScannerConfig::default(), "a<");
    assert_eq!(text(&events), "a<");
    assert_eq!(keys, ["HTML1003"]);
}

// =============================================================================
// Comments, CDATA, doctypes and processing instructions
// =============================================================================

#[test]
fn test_comment() {
    assert_eq!(notation(&scan("<!-- a -- b -->x")), ["# a -- b ", "\"x"]);
}

#[test]
fn test_unterminated_comment_ends_at_bracket() {
    assert_eq!(notation(&scan("<!-- a > b")), ["# a ", "\" b"]);
}

#[test]
fn test_cdata() {
    assert_eq!(notation(&scan("<![CDATA[x<y]]>")), ["#[CDATA[x<y]]"]);

    let config = ScannerConfig {
        cdata_sections: true,
        ..ScannerConfig::default()
    };
    assert_eq!(
        notation(&scan_with(config, "<![CDATA[x<y]]>")),
        ["[cdata", "\"x<y", "]cdata"]
    );
}

#[test]
fn test_doctype() {
    let events = scan(
        "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">",
    );
    assert_eq!(
        events[1],
        ScanEvent::Doctype {
            root: Some("html".to_string()),
            public_id: Some("-//W3C//DTD HTML 4.01//EN".to_string()),
            system_id: Some("http://www.w3.org/TR/html4/strict.dtd".to_string()),
            location: None,
        }
    );

    assert_eq!(notation(&scan("<!doctype html><p>")), ["!html", "(p"]);
}

#[test]
fn test_insert_and_override_doctype() {
    let config = ScannerConfig {
        insert_doctype: true,
        ..ScannerConfig::default()
    };
    let events = scan_with(config, "<p>");
    let ScanEvent::Doctype {
        root, public_id, ..
    } = &events[1]
    else {
        panic!("expected a doctype, got {:?}", events[1]);
    };
    assert_eq!(root.as_deref(), Some("html"));
    assert_eq!(public_id.as_deref(), Some("-//W3C//DTD HTML 4.01 Transitional//EN"));

    let config = ScannerConfig {
        override_doctype: true,
        doctype_public_id: "-//X//Y".to_string(),
        doctype_system_id: "y.dtd".to_string(),
        ..ScannerConfig::default()
    };
    assert_eq!(
        notation(&scan_with(config, "<!DOCTYPE html SYSTEM \"about:legacy-compat\">")),
        ["!html PUBLIC \"-//X//Y\" \"y.dtd\""]
    );
}

#[test]
fn test_processing_instruction() {
    let (events, keys) = scan_reporting(ScannerConfig::default(), "<?php echo 1; ?>");
    assert_eq!(notation(&events), ["?php echo 1; "]);
    assert_eq!(keys, ["HTML1008"]);
}

#[test]
fn test_xml_declaration() {
    let events = scan("<?xml version=\"1.0\" encoding=\"UTF-8\"?><p>");
    assert_eq!(
        events[1],
        ScanEvent::XmlDecl {
            version: Some("1.0".to_string()),
            encoding: Some("UTF-8".to_string()),
            standalone: None,
            location: None,
        }
    );
    assert_eq!(events[2].element_name(), Some("p"));
}

// =============================================================================
// Raw text
// =============================================================================

#[test]
fn test_script_content_is_verbatim() {
    assert_eq!(
        notation(&scan("<script>if (a < b) { x = \"</p>\"; }</script>")),
        ["(script", "\"if (a < b) { x = \"</p>\"; }", ")script"]
    );
}

#[test]
fn test_script_comment_hides_end_tag() {
    let html = "<script><!-- document.write(\"</script>\"); --></script>";
    assert_eq!(
        text(&scan(html)),
        "<!-- document.write(\"</script>\"); -->"
    );

    let config = ScannerConfig {
        script_strip_comment_delims: true,
        ..ScannerConfig::default()
    };
    assert_eq!(
        text(&scan_with(config, html)),
        " document.write(\"</script>\"); "
    );
}

#[test]
fn test_textarea_decodes_references_only() {
    let events = scan("<textarea>a <b> &amp; c</textarea>");
    assert_eq!(text(&events), "a <b> & c");
    let names: Vec<_> = events.iter().filter_map(ScanEvent::element_name).collect();
    assert_eq!(names, ["textarea", "textarea"]);
}

#[test]
fn test_style_keeps_references() {
    let events = scan("<style>p < b &amp; {}</style>");
    assert_eq!(text(&events), "p < b &amp; {}");
}

#[test]
fn test_title_is_raw_only_when_closed() {
    let closed = scan("<title>a<b>c</title>");
    assert_eq!(text(&closed), "a<b>c");

    let open = scan("<title>a<b>c");
    let names: Vec<_> = open.iter().filter_map(ScanEvent::element_name).collect();
    assert_eq!(names, ["title", "b"]);
}

// =============================================================================
// Character references
// =============================================================================

#[test]
fn test_references_in_content() {
    let (events, keys) = scan_reporting(
        ScannerConfig::default(),
        "a &amp; b &copy c &bogus; d &#65;&#x42;",
    );
    assert_eq!(text(&events), "a & b \u{a9} c &bogus; d AB");
    assert_eq!(keys, ["HTML1004", "HTML1006"]);
}

#[test]
fn test_windows_character_references() {
    assert_eq!(text(&scan("&#150;")), "\u{96}");

    let config = ScannerConfig {
        fix_windows_char_refs: true,
        ..ScannerConfig::default()
    };
    assert_eq!(text(&scan_with(config, "&#150;")), "\u{2013}");
}

#[test]
fn test_reference_notifications() {
    let config = ScannerConfig {
        notify_char_refs: true,
        ..ScannerConfig::default()
    };
    assert_eq!(notation(&scan_with(config, "&#65;")), ["&#65", "\"A", "/#65"]);

    let config = ScannerConfig {
        notify_xml_builtin_refs: true,
        ..ScannerConfig::default()
    };
    assert_eq!(
        notation(&scan_with(config, "&lt;&eacute;")),
        ["&lt", "\"<", "/lt", "\"\u{e9}"]
    );

    let config = ScannerConfig {
        notify_html_builtin_refs: true,
        ..ScannerConfig::default()
    };
    assert_eq!(
        notation(&scan_with(config, "&lt;&eacute;")),
        ["&lt", "\"<", "/lt", "&eacute", "\"\u{e9}", "/eacute"]
    );
}

// =============================================================================
// Line breaks and locations
// =============================================================================

#[test]
fn test_line_breaks_are_normalized() {
    assert_eq!(notation(&scan("a\r\nb\rc\n")), ["\"a\\nb\\nc\\n"]);
}

#[test]
fn test_locations() {
    let config = ScannerConfig {
        augmentations: true,
        ..ScannerConfig::default()
    };
    let events = scan_with(config, "<p>ab</p>\r\n<br>");

    let start = events[1].location().unwrap();
    assert_eq!((start.begin_offset, start.end_offset), (0, 3));
    assert_eq!((start.begin_column, start.end_column), (1, 4));

    let chars = events[2].location().unwrap();
    assert_eq!((chars.begin_offset, chars.end_offset), (3, 5));

    let br = events
        .iter()
        .find(|event| event.element_name() == Some("br"))
        .and_then(ScanEvent::location)
        .unwrap();
    assert_eq!((br.begin_line, br.begin_column), (2, 1));
    assert!(!br.synthesized);
}

#[test]
fn test_no_locations_by_default() {
    assert!(scan("<p>x</p>").iter().all(|event| event.location().is_none()));
}

// =============================================================================
// Nested sources
// =============================================================================

#[test]
fn test_pushed_source_is_scanned_first() {
    let mut scanner = HtmlScanner::new(ScannerConfig::default());
    scanner.set_input_source(InputSource::from_text("outer")).unwrap();
    scanner.push_input_source(InputSource::from_text("<i>inner</i>"));
    let events: Vec<_> = scanner.collect::<Result<_, _>>().unwrap();
    assert_eq!(notation(&events), ["(i", "\"inner", ")i", "\"outer"]);
}

#[test]
fn test_evaluated_source_is_delivered_in_place() {
    let mut scanner = HtmlScanner::new(ScannerConfig::default());
    scanner.set_input_source(InputSource::from_text("<p>after")).unwrap();
    let first = scanner.next_event().unwrap();
    assert!(matches!(first, Some(ScanEvent::StartDocument { .. })));

    scanner
        .evaluate_input_source(InputSource::from_text("<b>x</b>"))
        .unwrap();
    let mut collector = EventCollector::new();
    scanner.scan_document(&mut collector).unwrap();
    assert_eq!(
        notation(collector.events()),
        ["(b", "\"x", ")b", "(p", "\"after"]
    );
}

#[test]
fn test_cleanup_drops_pushed_sources() {
    let mut scanner = HtmlScanner::new(ScannerConfig::default());
    scanner.set_input_source(InputSource::from_text("outer")).unwrap();
    scanner.push_input_source(InputSource::from_text("inner"));
    scanner.cleanup(false);
    let events: Vec<_> = scanner.collect::<Result<_, _>>().unwrap();
    assert_eq!(text(&events), "outer");
}

#[test]
fn test_unsupported_declared_encoding() {
    let mut scanner = HtmlScanner::new(ScannerConfig::default());
    let result =
        scanner.set_input_source(InputSource::from_bytes(b"<p>x".to_vec()).with_encoding("x-bogus"));
    assert!(matches!(result, Err(Error::UnsupportedEncoding(label)) if label == "x-bogus"));
}
