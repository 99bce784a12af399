//! Integration tests for the entity table.

use quokka_html::entities;

#[test]
fn test_decode_is_case_sensitive() {
    assert_eq!(entities::decode("eacute"), Some('\u{e9}'));
    assert_eq!(entities::decode("Eacute"), Some('\u{c9}'));
    assert_eq!(entities::decode("nbsp"), Some('\u{a0}'));
    assert_eq!(entities::decode("AMP"), None);
    assert_eq!(entities::decode(""), None);
}

#[test]
fn test_encode_reverses_decode() {
    for (name, c) in entities::iter() {
        let encoded = entities::encode(c).expect("every tabled char has a name");
        assert_eq!(entities::decode(encoded), Some(c), "{name}");
    }
    assert_eq!(entities::encode('&'), Some("amp"));
    assert_eq!(entities::encode('<'), Some("lt"));
    assert_eq!(entities::encode('a'), None);
}

#[test]
fn test_table_size() {
    assert!(entities::iter().count() > 250);
}

#[test]
fn test_xml_builtins() {
    for name in ["amp", "lt", "gt", "quot", "apos"] {
        assert!(entities::is_xml_builtin(name), "{name}");
        assert!(entities::decode(name).is_some(), "{name}");
    }
    assert!(!entities::is_xml_builtin("nbsp"));
    assert!(!entities::is_xml_builtin("Amp"));
}

#[test]
fn test_windows_1252_remap() {
    assert_eq!(entities::windows_1252_remap(130), Some('\u{201a}'));
    assert_eq!(entities::windows_1252_remap(150), Some('\u{2013}'));
    assert_eq!(entities::windows_1252_remap(0x99), Some('\u{2122}'));
    assert_eq!(entities::windows_1252_remap(0x81), None);
    assert_eq!(entities::windows_1252_remap(0x41), None);
}
