//! Scanner, balancer and parser settings.
//!
//! All settings deserialize with `#[serde(default)]`, so a JSON file only
//! needs to name the options it changes.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How element and attribute names are cased on output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    /// Upper-case every name.
    Upper,
    /// Lower-case every name.
    #[default]
    Lower,
    /// Keep names as written.
    #[strum(to_string = "default", serialize = "match")]
    Default,
}

impl NameCase {
    /// Apply this casing to `name`.
    #[must_use]
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::Upper => name.to_uppercase(),
            Self::Lower => name.to_lowercase(),
            Self::Default => name.to_string(),
        }
    }
}

/// Scanner options.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Attach source locations to events.
    pub augmentations: bool,
    /// Send recoverable problems to the error reporter.
    pub report_errors: bool,
    /// Bracket numeric character references with entity events.
    pub notify_char_refs: bool,
    /// Bracket `amp`, `lt`, `gt`, `quot` and `apos` with entity events.
    pub notify_xml_builtin_refs: bool,
    /// Bracket every named HTML reference with entity events.
    pub notify_html_builtin_refs: bool,
    /// Map `&#128;`..`&#159;` to Windows-1252 punctuation in ISO-8859 documents.
    pub fix_windows_char_refs: bool,
    /// Strip a `<!-- -->` wrapper around script content.
    pub script_strip_comment_delims: bool,
    /// Strip a `<![CDATA[ ]]>` wrapper around script content.
    pub script_strip_cdata_delims: bool,
    /// Strip a `<!-- -->` wrapper around style content.
    pub style_strip_comment_delims: bool,
    /// Strip a `<![CDATA[ ]]>` wrapper around style content.
    pub style_strip_cdata_delims: bool,
    /// Never switch encodings because of `<meta>` or `<?xml?>`.
    pub ignore_specified_charset: bool,
    /// Report CDATA sections as such instead of as comments.
    pub cdata_sections: bool,
    /// Replace doctype identifiers with the configured ones.
    pub override_doctype: bool,
    /// Emit a doctype right after the document start.
    pub insert_doctype: bool,
    /// Collapse whitespace in quoted attribute values.
    pub normalize_attributes: bool,
    /// Parse `<noscript>` content as markup.
    pub parse_noscript_content: bool,
    /// Parse `<noframes>` content as markup.
    pub parse_noframes_content: bool,
    /// Casing of element names.
    pub names_elems: NameCase,
    /// Casing of attribute names.
    pub names_attrs: NameCase,
    /// Encoding used when a byte stream declares none and has no BOM.
    pub default_encoding: String,
    /// Public identifier for inserted or overridden doctypes.
    pub doctype_public_id: String,
    /// System identifier for inserted or overridden doctypes.
    pub doctype_system_id: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            augmentations: false,
            report_errors: false,
            notify_char_refs: false,
            notify_xml_builtin_refs: false,
            notify_html_builtin_refs: false,
            fix_windows_char_refs: false,
            script_strip_comment_delims: false,
            script_strip_cdata_delims: false,
            style_strip_comment_delims: false,
            style_strip_cdata_delims: false,
            ignore_specified_charset: false,
            cdata_sections: false,
            override_doctype: false,
            insert_doctype: false,
            normalize_attributes: false,
            parse_noscript_content: true,
            parse_noframes_content: false,
            names_elems: NameCase::Lower,
            names_attrs: NameCase::Lower,
            default_encoding: "Windows-1252".to_string(),
            doctype_public_id: "-//W3C//DTD HTML 4.01 Transitional//EN".to_string(),
            doctype_system_id: "http://www.w3.org/TR/html4/loose.dtd".to_string(),
        }
    }
}

/// Tag balancer options.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Attach synthesized locations to invented events.
    pub augmentations: bool,
    /// Send repairs to the error reporter.
    pub report_errors: bool,
    /// Balance a fragment instead of a whole document.
    pub document_fragment: bool,
    /// Forward `</body>` and `</html>` immediately instead of deferring them.
    pub ignore_outside_content: bool,
    /// Elements that enclose the fragment, outermost first.
    pub fragment_context: Vec<String>,
    /// Casing of element names.
    pub names_elems: NameCase,
    /// Casing of attribute names.
    pub names_attrs: NameCase,
}

/// Options for a whole scan-and-balance pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Run the tag balancer between scanner and sink.
    pub balance_tags: bool,
    /// Scanner settings.
    pub scanner: ScannerConfig,
    /// Balancer settings.
    pub balancer: BalancerConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            balance_tags: true,
            scanner: ScannerConfig::default(),
            balancer: BalancerConfig::default(),
        }
    }
}

impl ParserConfig {
    /// Turn location augmentations on or off in both stages.
    #[must_use]
    pub const fn with_augmentations(mut self, on: bool) -> Self {
        self.scanner.augmentations = on;
        self.balancer.augmentations = on;
        self
    }

    /// Turn error reporting on or off in both stages.
    #[must_use]
    pub const fn with_report_errors(mut self, on: bool) -> Self {
        self.scanner.report_errors = on;
        self.balancer.report_errors = on;
        self
    }

    /// Set element name casing in both stages.
    #[must_use]
    pub const fn with_names_elems(mut self, case: NameCase) -> Self {
        self.scanner.names_elems = case;
        self.balancer.names_elems = case;
        self
    }

    /// Set attribute name casing in both stages.
    #[must_use]
    pub const fn with_names_attrs(mut self, case: NameCase) -> Self {
        self.scanner.names_attrs = case;
        self.balancer.names_attrs = case;
        self
    }

    /// Copy the options the two stages share from the scanner to the balancer.
    pub fn sync_shared(&mut self) {
        self.balancer.augmentations = self.scanner.augmentations;
        self.balancer.report_errors = self.scanner.report_errors;
        self.balancer.names_elems = self.scanner.names_elems;
        self.balancer.names_attrs = self.scanner.names_attrs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ParserConfig =
            serde_json::from_str(r#"{"scanner": {"names_elems": "upper", "cdata_sections": true}}"#)
                .unwrap();
        assert!(config.balance_tags);
        assert_eq!(config.scanner.names_elems, NameCase::Upper);
        assert!(config.scanner.cdata_sections);
        assert!(config.scanner.parse_noscript_content);
        assert_eq!(config.scanner.default_encoding, "Windows-1252");
    }

    #[test]
    fn test_name_case_parses_from_str() {
        assert_eq!("UPPER".parse::<NameCase>().unwrap(), NameCase::Upper);
        assert_eq!("match".parse::<NameCase>().unwrap(), NameCase::Default);
        assert_eq!(NameCase::Lower.apply("DiV"), "div");
    }
}
