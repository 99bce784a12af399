//! Markup events produced by the scanner and repaired by the balancer.

use std::fmt;

use serde::Serialize;

/// A point in the input: 1-based line and column, 0-based character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number, starting at 1.
    pub column: usize,
    /// Characters consumed before this point.
    pub offset: usize,
}

impl Position {
    /// Beginning of a document.
    pub const START: Self = Self {
        line: 1,
        column: 1,
        offset: 0,
    };
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

/// Source span of one event.
///
/// Events the balancer invents (implied tags) carry a location with zeroed
/// positions and `synthesized` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Location {
    /// Line where the event starts.
    pub begin_line: usize,
    /// Column where the event starts.
    pub begin_column: usize,
    /// Character offset where the event starts.
    pub begin_offset: usize,
    /// Line where the event ends.
    pub end_line: usize,
    /// Column where the event ends.
    pub end_column: usize,
    /// Character offset where the event ends.
    pub end_offset: usize,
    /// The event does not correspond to anything in the input.
    pub synthesized: bool,
}

impl Location {
    /// Span between two positions.
    #[must_use]
    pub const fn span(begin: Position, end: Position) -> Self {
        Self {
            begin_line: begin.line,
            begin_column: begin.column,
            begin_offset: begin.offset,
            end_line: end.line,
            end_column: end.column,
            end_offset: end.offset,
            synthesized: false,
        }
    }

    /// Location of an event that was not in the input.
    #[must_use]
    pub const fn synthesized() -> Self {
        Self {
            begin_line: 0,
            begin_column: 0,
            begin_offset: 0,
            end_line: 0,
            end_column: 0,
            end_offset: 0,
            synthesized: true,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.synthesized {
            return f.write_str("synthesized");
        }
        write!(
            f,
            "{}:{}-{}:{}",
            self.begin_line, self.begin_column, self.end_line, self.end_column
        )
    }
}

/// One attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Attribute name, case-adjusted per configuration.
    pub name: String,
    /// Value with entities decoded (and whitespace normalized if enabled).
    pub value: String,
    /// Value exactly as written between the quotes.
    pub non_normalized_value: String,
    /// Span of the attribute, when augmentations are on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Attribute {
    /// Attribute whose raw and decoded values are the same.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            non_normalized_value: value.clone(),
            value,
            location: None,
        }
    }
}

/// Find an attribute value by name, ignoring ASCII case.
#[must_use]
pub fn attribute_value<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|attr| attr.name.eq_ignore_ascii_case(name))
        .map(|attr| attr.value.as_str())
}

/// One markup event.
///
/// Every variant carries an optional [`Location`], present only when the
/// producer was configured with augmentations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    /// Beginning of the document.
    StartDocument {
        /// Span.
        location: Option<Location>,
    },
    /// `<?xml version=... encoding=... standalone=...?>`.
    XmlDecl {
        /// `version` pseudo-attribute.
        version: Option<String>,
        /// `encoding` pseudo-attribute.
        encoding: Option<String>,
        /// `standalone` pseudo-attribute.
        standalone: Option<String>,
        /// Span.
        location: Option<Location>,
    },
    /// `<!DOCTYPE root PUBLIC "..." "...">`.
    Doctype {
        /// Root element name (absent when the declaration omitted it).
        root: Option<String>,
        /// Public identifier.
        public_id: Option<String>,
        /// System identifier.
        system_id: Option<String>,
        /// Span.
        location: Option<Location>,
    },
    /// A start tag.
    StartElement {
        /// Element name.
        name: String,
        /// Attributes in source order.
        attributes: Vec<Attribute>,
        /// Span.
        location: Option<Location>,
    },
    /// A start tag that is also its own end (`<br/>` or an EMPTY element).
    EmptyElement {
        /// Element name.
        name: String,
        /// Attributes in source order.
        attributes: Vec<Attribute>,
        /// Span.
        location: Option<Location>,
    },
    /// An end tag.
    EndElement {
        /// Element name.
        name: String,
        /// Span.
        location: Option<Location>,
    },
    /// Character data.
    Characters {
        /// Text with entities decoded and newlines normalized.
        text: String,
        /// Span.
        location: Option<Location>,
    },
    /// A comment.
    Comment {
        /// Comment body without the delimiters.
        text: String,
        /// Span.
        location: Option<Location>,
    },
    /// Start of a CDATA section.
    StartCData {
        /// Span.
        location: Option<Location>,
    },
    /// End of a CDATA section.
    EndCData {
        /// Span.
        location: Option<Location>,
    },
    /// `<?target data?>`.
    ProcessingInstruction {
        /// Target name.
        target: String,
        /// Everything after the target.
        data: String,
        /// Span.
        location: Option<Location>,
    },
    /// Start of the text an entity reference expanded to.
    StartEntity {
        /// Entity name, `#65` style for character references.
        name: String,
        /// Span.
        location: Option<Location>,
    },
    /// End of the text an entity reference expanded to.
    EndEntity {
        /// Entity name.
        name: String,
        /// Span.
        location: Option<Location>,
    },
    /// End of the document.
    EndDocument {
        /// Span.
        location: Option<Location>,
    },
}

impl ScanEvent {
    /// The event's location, if it carries one.
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        match self {
            Self::StartDocument { location }
            | Self::XmlDecl { location, .. }
            | Self::Doctype { location, .. }
            | Self::StartElement { location, .. }
            | Self::EmptyElement { location, .. }
            | Self::EndElement { location, .. }
            | Self::Characters { location, .. }
            | Self::Comment { location, .. }
            | Self::StartCData { location }
            | Self::EndCData { location }
            | Self::ProcessingInstruction { location, .. }
            | Self::StartEntity { location, .. }
            | Self::EndEntity { location, .. }
            | Self::EndDocument { location } => *location,
        }
    }

    /// Element name for start, empty and end events.
    #[must_use]
    pub fn element_name(&self) -> Option<&str> {
        match self {
            Self::StartElement { name, .. }
            | Self::EmptyElement { name, .. }
            | Self::EndElement { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Line-oriented event notation used by the CLI and in tests.
///
/// `(name` start, `)name` end, `"text` characters (newlines as `\n`),
/// `#text` comment, `!root` doctype, `?target data` instruction, `&name` and
/// `/name` entity brackets. Attributes follow their start tag as `Aname value`.
impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartDocument { .. } => f.write_str("[start-document]"),
            Self::EndDocument { .. } => f.write_str("[end-document]"),
            Self::XmlDecl {
                version,
                encoding,
                standalone,
                ..
            } => {
                f.write_str("?xml")?;
                for (key, value) in [
                    ("version", version),
                    ("encoding", encoding),
                    ("standalone", standalone),
                ] {
                    if let Some(value) = value {
                        write!(f, " {key}={value}")?;
                    }
                }
                Ok(())
            }
            Self::Doctype {
                root,
                public_id,
                system_id,
                ..
            } => {
                write!(f, "!{}", root.as_deref().unwrap_or(""))?;
                if let Some(public_id) = public_id {
                    write!(f, " PUBLIC \"{public_id}\"")?;
                }
                if let Some(system_id) = system_id {
                    write!(f, " \"{system_id}\"")?;
                }
                Ok(())
            }
            Self::StartElement {
                name, attributes, ..
            }
            | Self::EmptyElement {
                name, attributes, ..
            } => {
                write!(f, "({name}")?;
                for attr in attributes {
                    write!(f, "\nA{} {}", attr.name, escape_newlines(&attr.value))?;
                }
                if matches!(self, Self::EmptyElement { .. }) {
                    write!(f, "\n){name}")?;
                }
                Ok(())
            }
            Self::EndElement { name, .. } => write!(f, "){name}"),
            Self::Characters { text, .. } => write!(f, "\"{}", escape_newlines(text)),
            Self::Comment { text, .. } => write!(f, "#{}", escape_newlines(text)),
            Self::StartCData { .. } => f.write_str("[cdata"),
            Self::EndCData { .. } => f.write_str("]cdata"),
            Self::ProcessingInstruction { target, data, .. } => write!(f, "?{target} {data}"),
            Self::StartEntity { name, .. } => write!(f, "&{name}"),
            Self::EndEntity { name, .. } => write!(f, "/{name}"),
        }
    }
}

fn escape_newlines(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\n', "\\n").replace('\t', "\\t")
}
