//! HTML 4 entity table.
//!
//! Named references from the HTML 4.01 Latin-1, special and symbol sets plus
//! the five XML built-ins. The table maps in both directions: [`decode`] for
//! the scanner and [`encode`] for the writer.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Latin-1 entities, in code point order from U+00A0.
const LATIN1: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect", "uml", "copy", "ordf",
    "laquo", "not", "shy", "reg", "macr", "deg", "plusmn", "sup2", "sup3", "acute", "micro",
    "para", "middot", "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil", "Egrave", "Eacute",
    "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml", "ETH", "Ntilde", "Ograve", "Oacute",
    "Ocirc", "Otilde", "Ouml", "times", "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute",
    "THORN", "szlig", "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml", "eth", "ntilde",
    "ograve", "oacute", "ocirc", "otilde", "ouml", "divide", "oslash", "ugrave", "uacute", "ucirc",
    "uuml", "yacute", "thorn", "yuml",
];

/// Markup-significant and internationalization characters.
const SPECIAL: &[(&str, u32)] = &[
    ("quot", 34),
    ("amp", 38),
    ("lt", 60),
    ("gt", 62),
    ("OElig", 338),
    ("oelig", 339),
    ("Scaron", 352),
    ("scaron", 353),
    ("Yuml", 376),
    ("circ", 710),
    ("tilde", 732),
    ("ensp", 8194),
    ("emsp", 8195),
    ("thinsp", 8201),
    ("zwnj", 8204),
    ("zwj", 8205),
    ("lrm", 8206),
    ("rlm", 8207),
    ("ndash", 8211),
    ("mdash", 8212),
    ("lsquo", 8216),
    ("rsquo", 8217),
    ("sbquo", 8218),
    ("ldquo", 8220),
    ("rdquo", 8221),
    ("bdquo", 8222),
    ("dagger", 8224),
    ("Dagger", 8225),
    ("permil", 8240),
    ("lsaquo", 8249),
    ("rsaquo", 8250),
    ("euro", 8364),
];

/// Mathematical symbols, Greek letters and arrows.
const SYMBOL: &[(&str, u32)] = &[
    ("fnof", 402),
    ("Alpha", 913),
    ("Beta", 914),
    ("Gamma", 915),
    ("Delta", 916),
    ("Epsilon", 917),
    ("Zeta", 918),
    ("Eta", 919),
    ("Theta", 920),
    ("Iota", 921),
    ("Kappa", 922),
    ("Lambda", 923),
    ("Mu", 924),
    ("Nu", 925),
    ("Xi", 926),
    ("Omicron", 927),
    ("Pi", 928),
    ("Rho", 929),
    ("Sigma", 931),
    ("Tau", 932),
    ("Upsilon", 933),
    ("Phi", 934),
    ("Chi", 935),
    ("Psi", 936),
    ("Omega", 937),
    ("alpha", 945),
    ("beta", 946),
    ("gamma", 947),
    ("delta", 948),
    ("epsilon", 949),
    ("zeta", 950),
    ("eta", 951),
    ("theta", 952),
    ("iota", 953),
    ("kappa", 954),
    ("lambda", 955),
    ("mu", 956),
    ("nu", 957),
    ("xi", 958),
    ("omicron", 959),
    ("pi", 960),
    ("rho", 961),
    ("sigmaf", 962),
    ("sigma", 963),
    ("tau", 964),
    ("upsilon", 965),
    ("phi", 966),
    ("chi", 967),
    ("psi", 968),
    ("omega", 969),
    ("thetasym", 977),
    ("upsih", 978),
    ("piv", 982),
    ("bull", 8226),
    ("hellip", 8230),
    ("prime", 8242),
    ("Prime", 8243),
    ("oline", 8254),
    ("frasl", 8260),
    ("weierp", 8472),
    ("image", 8465),
    ("real", 8476),
    ("trade", 8482),
    ("alefsym", 8501),
    ("larr", 8592),
    ("uarr", 8593),
    ("rarr", 8594),
    ("darr", 8595),
    ("harr", 8596),
    ("crarr", 8629),
    ("lArr", 8656),
    ("uArr", 8657),
    ("rArr", 8658),
    ("dArr", 8659),
    ("hArr", 8660),
    ("forall", 8704),
    ("part", 8706),
    ("exist", 8707),
    ("empty", 8709),
    ("nabla", 8711),
    ("isin", 8712),
    ("notin", 8713),
    ("ni", 8715),
    ("prod", 8719),
    ("sum", 8721),
    ("minus", 8722),
    ("lowast", 8727),
    ("radic", 8730),
    ("prop", 8733),
    ("infin", 8734),
    ("ang", 8736),
    ("and", 8743),
    ("or", 8744),
    ("cap", 8745),
    ("cup", 8746),
    ("int", 8747),
    ("there4", 8756),
    ("sim", 8764),
    ("cong", 8773),
    ("asymp", 8776),
    ("ne", 8800),
    ("equiv", 8801),
    ("le", 8804),
    ("ge", 8805),
    ("sub", 8834),
    ("sup", 8835),
    ("nsub", 8836),
    ("sube", 8838),
    ("supe", 8839),
    ("oplus", 8853),
    ("otimes", 8855),
    ("perp", 8869),
    ("sdot", 8901),
    ("lceil", 8968),
    ("rceil", 8969),
    ("lfloor", 8970),
    ("rfloor", 8971),
    ("lang", 9001),
    ("rang", 9002),
    ("loz", 9674),
    ("spades", 9824),
    ("clubs", 9827),
    ("hearts", 9829),
    ("diams", 9830),
];

/// Entities every XML processor predefines.
const XML_BUILTINS: &[(&str, u32)] = &[
    ("amp", 38),
    ("lt", 60),
    ("gt", 62),
    ("quot", 34),
    ("apos", 39),
];

/// Windows-1252 punctuation for the C1 range 0x82..=0x9F.
const WINDOWS_1252_C1: &[(u32, char)] = &[
    (130, '\u{201A}'),
    (131, '\u{0192}'),
    (132, '\u{201E}'),
    (133, '\u{2026}'),
    (134, '\u{2020}'),
    (135, '\u{2021}'),
    (136, '\u{02C6}'),
    (137, '\u{2030}'),
    (138, '\u{0160}'),
    (139, '\u{2039}'),
    (140, '\u{0152}'),
    (145, '\u{2018}'),
    (146, '\u{2019}'),
    (147, '\u{201C}'),
    (148, '\u{201D}'),
    (149, '\u{2022}'),
    (150, '\u{2013}'),
    (151, '\u{2014}'),
    (152, '\u{02DC}'),
    (153, '\u{2122}'),
    (154, '\u{0161}'),
    (155, '\u{203A}'),
    (156, '\u{0153}'),
    (159, '\u{0178}'),
];

struct EntityTable {
    by_name: HashMap<&'static str, char>,
    by_char: HashMap<char, &'static str>,
}

impl EntityTable {
    fn add(&mut self, name: &'static str, code: u32) {
        let Some(c) = char::from_u32(code) else {
            return;
        };
        let _ = self.by_name.insert(name, c);
        // First name registered for a character wins when encoding.
        let _ = self.by_char.entry(c).or_insert(name);
    }
}

static TABLE: LazyLock<EntityTable> = LazyLock::new(|| {
    let mut table = EntityTable {
        by_name: HashMap::new(),
        by_char: HashMap::new(),
    };
    for (offset, name) in (0xA0..).zip(LATIN1) {
        table.add(name, offset);
    }
    for &(name, code) in SPECIAL.iter().chain(SYMBOL).chain(XML_BUILTINS) {
        table.add(name, code);
    }
    table
});

/// Character for an entity name (case-sensitive, without `&` and `;`).
///
/// # Example
/// ```
/// assert_eq!(quokka_html::entities::decode("amp"), Some('&'));
/// assert_eq!(quokka_html::entities::decode("bogus"), None);
/// ```
#[must_use]
pub fn decode(name: &str) -> Option<char> {
    TABLE.by_name.get(name).copied()
}

/// Entity name for a character, if the table has one.
#[must_use]
pub fn encode(c: char) -> Option<&'static str> {
    TABLE.by_char.get(&c).copied()
}

/// Whether `name` is one of `amp`, `lt`, `gt`, `quot`, `apos`.
#[must_use]
pub fn is_xml_builtin(name: &str) -> bool {
    XML_BUILTINS.iter().any(|&(builtin, _)| builtin == name)
}

/// Windows-1252 replacement for a numeric reference in the C1 range.
///
/// Pages labelled ISO-8859-1 routinely contain `&#150;` meaning an en dash;
/// this maps such values to what the author saw.
#[must_use]
pub fn windows_1252_remap(value: u32) -> Option<char> {
    WINDOWS_1252_C1
        .iter()
        .find(|&&(code, _)| code == value)
        .map(|&(_, c)| c)
}

/// Every tabled `(name, char)` pair. Order is unspecified.
pub fn iter() -> impl Iterator<Item = (&'static str, char)> {
    TABLE.by_name.iter().map(|(&name, &c)| (name, c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_runs_to_yuml() {
        assert_eq!(decode("nbsp"), Some('\u{A0}'));
        assert_eq!(decode("times"), Some('\u{D7}'));
        assert_eq!(decode("yuml"), Some('\u{FF}'));
    }

    #[test]
    fn test_windows_remap_skips_undefined_slots() {
        assert_eq!(windows_1252_remap(150), Some('\u{2013}'));
        assert_eq!(windows_1252_remap(141), None);
        assert_eq!(windows_1252_remap(65), None);
    }
}
