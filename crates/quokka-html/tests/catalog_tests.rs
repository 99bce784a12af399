//! Integration tests for the element catalog.

use quokka_html::catalog::{self, ElementFlags};
use quokka_html::ElementCode;
use strum::EnumCount;

#[test]
fn test_lookup_ignores_case() {
    assert_eq!(catalog::lookup("table").code, ElementCode::Table);
    assert_eq!(catalog::lookup("TaBlE").code, ElementCode::Table);
    assert_eq!(catalog::lookup("BR").name, "BR");
}

#[test]
fn test_unknown_names_map_to_sentinel() {
    for name in ["", "blah", "1st", "x-widget"] {
        let info = catalog::lookup(name);
        assert_eq!(info.code, ElementCode::Unknown, "{name:?}");
        assert_eq!(info.name, "");
    }
    assert!(std::ptr::eq(catalog::lookup("blah"), catalog::unknown()));
}

#[test]
fn test_every_code_has_one_entry() {
    assert_eq!(catalog::all().len(), ElementCode::COUNT);
    for info in catalog::all() {
        assert!(std::ptr::eq(catalog::by_code(info.code), info));
        if info.code != ElementCode::Unknown {
            assert_eq!(catalog::lookup(info.name).code, info.code);
        }
    }
}

#[test]
fn test_flags() {
    assert!(catalog::lookup("br").is_empty());
    assert!(catalog::lookup("b").is_inline());
    assert!(catalog::lookup("div").is_block());
    let table = catalog::lookup("table");
    assert!(table.is_block() && table.is_container());
    for special in ["script", "style", "textarea", "title", "xmp", "plaintext"] {
        assert!(catalog::lookup(special).is_special(), "{special}");
    }
    assert!(catalog::lookup("li").flags.is_none());
    assert_eq!(
        (ElementFlags::INLINE | ElementFlags::EMPTY).bits(),
        ElementFlags::INLINE.bits() + ElementFlags::EMPTY.bits()
    );
}

#[test]
fn test_parents_and_bounds() {
    let li = catalog::lookup("li");
    assert_eq!(li.preferred_parent().map(|p| p.code), Some(ElementCode::Body));
    assert!(li.is_parent(catalog::lookup("ul")));
    assert!(li.is_parent(catalog::lookup("ol")));

    let td = catalog::lookup("td");
    assert_eq!(td.preferred_parent().map(|p| p.code), Some(ElementCode::Tr));
    assert_eq!(td.bounds, Some(ElementCode::Table));

    assert!(catalog::lookup("html").preferred_parent().is_none());
    assert_eq!(
        catalog::lookup("title").parents,
        &[ElementCode::Head, ElementCode::Body]
    );
}

#[test]
fn test_implicit_closes() {
    let p = catalog::lookup("p");
    assert!(p.closes(ElementCode::P));
    assert!(catalog::lookup("li").closes(ElementCode::Li));
    assert!(catalog::lookup("h2").closes(ElementCode::H1));
    assert!(catalog::lookup("body").closes(ElementCode::Head));
    assert!(catalog::lookup("tr").closes(ElementCode::Td));
    assert!(!catalog::lookup("b").closes(ElementCode::B));
}
