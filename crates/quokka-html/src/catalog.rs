//! Element catalog.
//!
//! Static per-tag metadata consulted by the scanner (which elements hold raw
//! text) and by the balancer (natural parents, implicit closes, inline/block).
//! The table is built at compile time; only the first-letter lookup buckets
//! are assembled lazily on first use.

use std::ops::BitOr;
use std::sync::LazyLock;

use strum::EnumCount;
use strum_macros::{Display, EnumCount as EnumCountMacro, FromRepr};

/// Small integer identity of a catalogued element.
///
/// Discriminants are contiguous from 0 in catalog order, so a code indexes the
/// element table directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumCountMacro, FromRepr)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ElementCode {
    A,
    Abbr,
    Acronym,
    Address,
    Applet,
    Area,
    B,
    Base,
    Basefont,
    Bdo,
    Bgsound,
    Big,
    Blink,
    Blockquote,
    Body,
    Br,
    Button,
    Caption,
    Center,
    Cite,
    Code,
    Col,
    Colgroup,
    Comment,
    Del,
    Dfn,
    Dir,
    Div,
    Dd,
    Dl,
    Dt,
    Em,
    Embed,
    Fieldset,
    Font,
    Form,
    Frame,
    Frameset,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Head,
    Hr,
    Html,
    I,
    Iframe,
    Ilayer,
    Img,
    Input,
    Ins,
    Isindex,
    Kbd,
    Keygen,
    Label,
    Layer,
    Legend,
    Li,
    Link,
    Listing,
    Map,
    Marquee,
    Menu,
    Meta,
    Multicol,
    Nextid,
    Nobr,
    Noembed,
    Noframes,
    Nolayer,
    Noscript,
    Object,
    Ol,
    Option,
    Optgroup,
    P,
    Param,
    Plaintext,
    Pre,
    Q,
    Rb,
    Rbc,
    Rp,
    Rt,
    Rtc,
    Ruby,
    S,
    Samp,
    Script,
    Select,
    Small,
    Sound,
    Spacer,
    Span,
    Strike,
    Strong,
    Style,
    Sub,
    Sup,
    Table,
    Tbody,
    Td,
    Textarea,
    Tfoot,
    Th,
    Thead,
    Title,
    Tr,
    Tt,
    U,
    Ul,
    Var,
    Wbr,
    Xml,
    Xmp,
    /// Sentinel for every name the catalog does not know.
    Unknown,
}

/// Bitset of structural properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ElementFlags(u8);

impl ElementFlags {
    /// No flags at all. Such elements split open inline elements around them.
    pub const NONE: Self = Self(0);
    /// Phrase-level element (`b`, `i`, `a`, ...).
    pub const INLINE: Self = Self(0x01);
    /// Block-level element; stops implicit-close and end-tag searches.
    pub const BLOCK: Self = Self(0x02);
    /// Element that never has content (`br`, `img`, ...).
    pub const EMPTY: Self = Self(0x04);
    /// Element that may contain block elements of its own kind.
    pub const CONTAINER: Self = Self(0x08);
    /// Element whose content is raw text rather than markup.
    pub const SPECIAL: Self = Self(0x10);

    /// Raw bit value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Combination of both flag sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether no flag is set.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ElementFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Catalog entry for one element.
#[derive(Debug, PartialEq, Eq)]
pub struct ElementInfo {
    /// Identity, also the index into the catalog.
    pub code: ElementCode,
    /// Canonical upper-case name (empty for [`ElementCode::Unknown`]).
    pub name: &'static str,
    /// Structural flags.
    pub flags: ElementFlags,
    /// Natural parents; the first one is the preferred parent.
    pub parents: &'static [ElementCode],
    /// Ancestor that stops the search for a natural parent.
    pub bounds: Option<ElementCode>,
    /// Elements implicitly closed when this one starts.
    pub closes: &'static [ElementCode],
}

impl ElementInfo {
    /// Phrase-level element.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        self.flags.contains(ElementFlags::INLINE)
    }

    /// Block-level element.
    #[must_use]
    pub const fn is_block(&self) -> bool {
        self.flags.contains(ElementFlags::BLOCK)
    }

    /// Element that never has content.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.flags.contains(ElementFlags::EMPTY)
    }

    /// Container element.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        self.flags.contains(ElementFlags::CONTAINER)
    }

    /// Raw-text element.
    #[must_use]
    pub const fn is_special(&self) -> bool {
        self.flags.contains(ElementFlags::SPECIAL)
    }

    /// Whether starting this element implicitly closes an open `code`.
    #[must_use]
    pub fn closes(&self, code: ElementCode) -> bool {
        self.closes.contains(&code)
    }

    /// Whether `element` is one of this element's natural parents.
    #[must_use]
    pub fn is_parent(&self, element: &ElementInfo) -> bool {
        self.parents.contains(&element.code)
    }

    /// The preferred natural parent, if the element has any.
    #[must_use]
    pub fn preferred_parent(&self) -> Option<&'static ElementInfo> {
        self.parents.first().map(|&code| by_code(code))
    }
}

use ElementCode as E;

const INLINE: ElementFlags = ElementFlags::INLINE;
const BLOCK: ElementFlags = ElementFlags::BLOCK;
const EMPTY: ElementFlags = ElementFlags::EMPTY;
const CONTAINER: ElementFlags = ElementFlags::CONTAINER;
const SPECIAL: ElementFlags = ElementFlags::SPECIAL;
const NONE: ElementFlags = ElementFlags::NONE;

const IN_BODY: &[ElementCode] = &[E::Body];
const IN_HEAD: &[ElementCode] = &[E::Head];
const IN_HTML: &[ElementCode] = &[E::Html];
const IN_TABLE: &[ElementCode] = &[E::Table];
const IN_DL: &[ElementCode] = &[E::Dl];
const IN_RUBY: &[ElementCode] = &[E::Ruby];
const IN_SELECT: &[ElementCode] = &[E::Select];
const IN_HEAD_OR_BODY: &[ElementCode] = &[E::Head, E::Body];
const NOWHERE: &[ElementCode] = &[];

const CLOSES_NOTHING: &[ElementCode] = &[];
const CLOSES_P: &[ElementCode] = &[E::P];
const CLOSES_HEADINGS: &[ElementCode] = &[E::H1, E::H2, E::H3, E::H4, E::H5, E::H6, E::P];
const CLOSES_DEFINITIONS: &[ElementCode] = &[E::Dt, E::Dd];
const CLOSES_CELLS: &[ElementCode] = &[E::Td, E::Th];
const CLOSES_TABLE_SECTIONS: &[ElementCode] =
    &[E::Thead, E::Tbody, E::Tfoot, E::Td, E::Th, E::Tr, E::Colgroup];

const fn element(
    code: ElementCode,
    name: &'static str,
    flags: ElementFlags,
    parents: &'static [ElementCode],
    closes: &'static [ElementCode],
) -> ElementInfo {
    ElementInfo {
        code,
        name,
        flags,
        parents,
        bounds: None,
        closes,
    }
}

const fn bounded(
    code: ElementCode,
    name: &'static str,
    flags: ElementFlags,
    parents: &'static [ElementCode],
    bounds: ElementCode,
    closes: &'static [ElementCode],
) -> ElementInfo {
    ElementInfo {
        code,
        name,
        flags,
        parents,
        bounds: Some(bounds),
        closes,
    }
}

static ELEMENTS: [ElementInfo; ElementCode::COUNT] = [
    element(E::A, "A", INLINE, IN_BODY, &[E::A]),
    element(E::Abbr, "ABBR", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Acronym, "ACRONYM", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Address, "ADDRESS", BLOCK, IN_BODY, CLOSES_NOTHING),
    element(E::Applet, "APPLET", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Area, "AREA", EMPTY, &[E::Map], CLOSES_NOTHING),
    element(E::B, "B", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Base, "BASE", EMPTY, IN_HEAD, CLOSES_NOTHING),
    element(E::Basefont, "BASEFONT", NONE, IN_HEAD, CLOSES_NOTHING),
    element(E::Bdo, "BDO", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Bgsound, "BGSOUND", EMPTY, IN_HEAD, CLOSES_NOTHING),
    element(E::Big, "BIG", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Blink, "BLINK", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Blockquote, "BLOCKQUOTE", BLOCK, IN_BODY, CLOSES_P),
    element(E::Body, "BODY", CONTAINER, IN_HTML, &[E::Head]),
    element(E::Br, "BR", EMPTY, IN_BODY, CLOSES_NOTHING),
    element(E::Button, "BUTTON", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Caption, "CAPTION", INLINE, IN_TABLE, CLOSES_NOTHING),
    element(E::Center, "CENTER", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Cite, "CITE", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Code, "CODE", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Col, "COL", EMPTY, IN_TABLE, CLOSES_NOTHING),
    element(E::Colgroup, "COLGROUP", NONE, IN_TABLE, &[E::Col, E::Colgroup]),
    element(E::Comment, "COMMENT", SPECIAL, IN_HTML, CLOSES_NOTHING),
    element(E::Del, "DEL", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Dfn, "DFN", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Dir, "DIR", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Div, "DIV", BLOCK, IN_BODY, CLOSES_P),
    element(E::Dd, "DD", NONE, IN_DL, CLOSES_DEFINITIONS),
    element(E::Dl, "DL", BLOCK, IN_BODY, CLOSES_NOTHING),
    element(E::Dt, "DT", NONE, IN_DL, CLOSES_DEFINITIONS),
    element(E::Em, "EM", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Embed, "EMBED", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Fieldset, "FIELDSET", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Font, "FONT", CONTAINER, IN_BODY, CLOSES_NOTHING),
    element(E::Form, "FORM", CONTAINER, &[E::Body, E::Td, E::Div], &[E::Button, E::P]),
    element(E::Frame, "FRAME", EMPTY, &[E::Frameset], CLOSES_NOTHING),
    element(E::Frameset, "FRAMESET", NONE, IN_HTML, CLOSES_NOTHING),
    element(E::H1, "H1", BLOCK, &[E::Body, E::A], CLOSES_HEADINGS),
    element(E::H2, "H2", BLOCK, &[E::Body, E::A], CLOSES_HEADINGS),
    element(E::H3, "H3", BLOCK, &[E::Body, E::A], CLOSES_HEADINGS),
    element(E::H4, "H4", BLOCK, &[E::Body, E::A], CLOSES_HEADINGS),
    element(E::H5, "H5", BLOCK, &[E::Body, E::A], CLOSES_HEADINGS),
    element(E::H6, "H6", BLOCK, &[E::Body, E::A], CLOSES_HEADINGS),
    element(E::Head, "HEAD", NONE, IN_HTML, CLOSES_NOTHING),
    element(E::Hr, "HR", EMPTY, IN_BODY, CLOSES_P),
    element(E::Html, "HTML", NONE, NOWHERE, CLOSES_NOTHING),
    element(E::I, "I", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Iframe, "IFRAME", BLOCK, IN_BODY, CLOSES_NOTHING),
    element(E::Ilayer, "ILAYER", BLOCK, IN_BODY, CLOSES_NOTHING),
    element(E::Img, "IMG", EMPTY, IN_BODY, CLOSES_NOTHING),
    element(E::Input, "INPUT", EMPTY, IN_BODY, CLOSES_NOTHING),
    element(E::Ins, "INS", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Isindex, "ISINDEX", NONE, IN_HEAD, CLOSES_NOTHING),
    element(E::Kbd, "KBD", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Keygen, "KEYGEN", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Label, "LABEL", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Layer, "LAYER", BLOCK, IN_BODY, CLOSES_NOTHING),
    element(E::Legend, "LEGEND", INLINE, &[E::Fieldset], CLOSES_NOTHING),
    element(E::Li, "LI", NONE, &[E::Body, E::Ul, E::Ol], &[E::Li]),
    element(E::Link, "LINK", EMPTY, IN_HEAD, CLOSES_NOTHING),
    element(E::Listing, "LISTING", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Map, "MAP", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Marquee, "MARQUEE", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Menu, "MENU", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Meta, "META", EMPTY, IN_HEAD, &[E::Style, E::Title]),
    element(E::Multicol, "MULTICOL", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Nextid, "NEXTID", EMPTY, IN_BODY, CLOSES_NOTHING),
    element(E::Nobr, "NOBR", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Noembed, "NOEMBED", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Noframes, "NOFRAMES", NONE, NOWHERE, CLOSES_NOTHING),
    element(E::Nolayer, "NOLAYER", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Noscript, "NOSCRIPT", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Object, "OBJECT", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Ol, "OL", BLOCK, IN_BODY, CLOSES_NOTHING),
    element(E::Option, "OPTION", NONE, IN_SELECT, &[E::Option]),
    element(E::Optgroup, "OPTGROUP", NONE, IN_SELECT, &[E::Option]),
    element(E::P, "P", CONTAINER, IN_BODY, CLOSES_P),
    element(E::Param, "PARAM", EMPTY, &[E::Object, E::Applet], CLOSES_NOTHING),
    element(E::Plaintext, "PLAINTEXT", SPECIAL, IN_BODY, CLOSES_NOTHING),
    element(E::Pre, "PRE", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Q, "Q", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Rb, "RB", INLINE, IN_RUBY, &[E::Rb]),
    element(E::Rbc, "RBC", NONE, IN_RUBY, CLOSES_NOTHING),
    element(E::Rp, "RP", INLINE, IN_RUBY, &[E::Rb]),
    element(E::Rt, "RT", INLINE, IN_RUBY, &[E::Rb, E::Rp]),
    element(E::Rtc, "RTC", NONE, IN_RUBY, &[E::Rbc]),
    element(E::Ruby, "RUBY", NONE, IN_BODY, &[E::Ruby]),
    element(E::S, "S", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Samp, "SAMP", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Script, "SCRIPT", SPECIAL, IN_HEAD_OR_BODY, CLOSES_NOTHING),
    element(E::Select, "SELECT", CONTAINER, IN_BODY, &[E::Select]),
    element(E::Small, "SMALL", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Sound, "SOUND", EMPTY, IN_HEAD, CLOSES_NOTHING),
    element(E::Spacer, "SPACER", EMPTY, IN_BODY, CLOSES_NOTHING),
    element(E::Span, "SPAN", CONTAINER, IN_BODY, CLOSES_NOTHING),
    element(E::Strike, "STRIKE", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Strong, "STRONG", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Style, "STYLE", SPECIAL, IN_HEAD_OR_BODY, &[E::Style, E::Title, E::Meta]),
    element(E::Sub, "SUB", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Sup, "SUP", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Table, "TABLE", BLOCK.union(CONTAINER), IN_BODY, CLOSES_NOTHING),
    element(E::Tbody, "TBODY", NONE, IN_TABLE, CLOSES_TABLE_SECTIONS),
    bounded(E::Td, "TD", CONTAINER, &[E::Tr], E::Table, CLOSES_CELLS),
    element(E::Textarea, "TEXTAREA", SPECIAL, IN_BODY, CLOSES_NOTHING),
    element(E::Tfoot, "TFOOT", NONE, IN_TABLE, &[E::Thead, E::Tbody, E::Tfoot, E::Td, E::Th, E::Tr]),
    bounded(E::Th, "TH", CONTAINER, &[E::Tr], E::Table, CLOSES_CELLS),
    element(E::Thead, "THEAD", NONE, IN_TABLE, CLOSES_TABLE_SECTIONS),
    element(E::Title, "TITLE", SPECIAL, IN_HEAD_OR_BODY, CLOSES_NOTHING),
    bounded(
        E::Tr,
        "TR",
        BLOCK,
        &[E::Tbody, E::Thead, E::Tfoot],
        E::Table,
        &[E::Td, E::Th, E::Tr, E::Colgroup],
    ),
    element(E::Tt, "TT", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::U, "U", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Ul, "UL", BLOCK, IN_BODY, CLOSES_NOTHING),
    element(E::Var, "VAR", INLINE, IN_BODY, CLOSES_NOTHING),
    element(E::Wbr, "WBR", EMPTY, IN_BODY, CLOSES_NOTHING),
    element(E::Xml, "XML", NONE, IN_BODY, CLOSES_NOTHING),
    element(E::Xmp, "XMP", SPECIAL, IN_BODY, CLOSES_NOTHING),
    element(E::Unknown, "", CONTAINER, &[E::Body, E::Head], CLOSES_NOTHING),
];

/// Elements grouped by the upper-cased first letter of their name.
static BUCKETS: LazyLock<[Vec<&'static ElementInfo>; 26]> = LazyLock::new(|| {
    let mut buckets: [Vec<&'static ElementInfo>; 26] = Default::default();
    for info in &ELEMENTS {
        if let Some(first) = info.name.bytes().next() {
            buckets[usize::from(first - b'A')].push(info);
        }
    }
    buckets
});

/// Look up an element by name, ignoring ASCII case.
///
/// Never fails: names the catalog does not know map to the
/// [`ElementCode::Unknown`] sentinel.
#[must_use]
pub fn lookup(name: &str) -> &'static ElementInfo {
    let Some(first) = name.bytes().next() else {
        return unknown();
    };
    if !first.is_ascii_alphabetic() {
        return unknown();
    }
    let bucket = &BUCKETS[usize::from(first.to_ascii_uppercase() - b'A')];
    bucket
        .iter()
        .copied()
        .find(|info| info.name.eq_ignore_ascii_case(name))
        .unwrap_or_else(unknown)
}

/// Catalog entry for `code`.
#[must_use]
pub fn by_code(code: ElementCode) -> &'static ElementInfo {
    &ELEMENTS[code as usize]
}

/// The sentinel entry for unknown elements.
#[must_use]
pub fn unknown() -> &'static ElementInfo {
    by_code(ElementCode::Unknown)
}

/// Every catalog entry, in code order.
#[must_use]
pub fn all() -> &'static [ElementInfo] {
    &ELEMENTS
}
