//! Message keys for scanner and balancer diagnostics.

use quokka_common::{Diagnostic, Severity};
use strum_macros::{Display, IntoStaticStr};

/// Stable identifier of a recoverable problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum MessageKey {
    /// No encoding declared or sniffed; the default is used.
    #[strum(serialize = "HTML1000")]
    EncodingNotSpecified,
    /// An encoding label no decoder knows.
    #[strum(serialize = "HTML1001")]
    UnsupportedEncodingName,
    /// `<!` followed by something other than a comment, CDATA or doctype.
    #[strum(serialize = "HTML1002")]
    UnknownMarkupDeclaration,
    /// Input ended right after `<`.
    #[strum(serialize = "HTML1003")]
    EofInMarkupBracket,
    /// Entity reference without a closing `;`.
    #[strum(serialize = "HTML1004")]
    EntityMissingSemicolon,
    /// Numeric reference that is not a valid character.
    #[strum(serialize = "HTML1005")]
    InvalidCharacterReference,
    /// Named reference the entity table does not know.
    #[strum(serialize = "HTML1006")]
    UnknownEntity,
    /// Input ended inside a construct.
    #[strum(serialize = "HTML1007")]
    UnexpectedEof,
    /// Processing instruction in an HTML document.
    #[strum(serialize = "HTML1008")]
    ProcessingInstruction,
    /// `<` followed by something that is not a tag name.
    #[strum(serialize = "HTML1009")]
    StartTagNameNotLetter,
    /// A declared charset cannot be decoded.
    #[strum(serialize = "HTML1010")]
    UnsupportedCharset,
    /// Garbage where an attribute name was expected.
    #[strum(serialize = "HTML1011")]
    MissingAttributeName,
    /// `</` without a name.
    #[strum(serialize = "HTML1012")]
    MissingEndTagName,
    /// Attribute directly after the previous one.
    #[strum(serialize = "HTML1013")]
    AttributeNotSeparated,
    /// `<!DOCTYPE>` without a root name.
    #[strum(serialize = "HTML1014")]
    MissingDoctypeRoot,
    /// A declared charset reads the document head differently.
    #[strum(serialize = "HTML1015")]
    IncompatibleEncodingChange,
    /// Nothing but whitespace in the document.
    #[strum(serialize = "HTML2000")]
    EmptyDocument,
    /// Element still open at end of input.
    #[strum(serialize = "HTML2001")]
    UnclosedElement,
    /// Preferred parent inserted before the root.
    #[strum(serialize = "HTML2002")]
    ParentForcedBeforeRoot,
    /// Missing natural parent inserted.
    #[strum(serialize = "HTML2004")]
    ParentForced,
    /// Start tag closed an open element.
    #[strum(serialize = "HTML2005")]
    ImplicitClose,
    /// Body inserted around content.
    #[strum(serialize = "HTML2006")]
    BodyForced,
    /// End tag closed elements opened after its own.
    #[strum(serialize = "HTML2007")]
    IntermediateClosed,
    /// Inline element reopened after a repair.
    #[strum(serialize = "HTML2008")]
    InlineReopened,
    /// Content in head or html moved into the body.
    #[strum(serialize = "HTML2009")]
    ContentMovedToBody,
    /// Doctype after the root element.
    #[strum(serialize = "HTML2010")]
    DoctypeAfterRoot,
    /// Second doctype.
    #[strum(serialize = "HTML2011")]
    DuplicateDoctype,
}

impl MessageKey {
    /// The key string, e.g. `HTML1006`.
    #[must_use]
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// How serious the problem is.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::EncodingNotSpecified
            | Self::EntityMissingSemicolon
            | Self::UnknownEntity
            | Self::ProcessingInstruction
            | Self::UnclosedElement
            | Self::ParentForcedBeforeRoot
            | Self::ParentForced
            | Self::ImplicitClose
            | Self::BodyForced
            | Self::IntermediateClosed
            | Self::InlineReopened
            | Self::ContentMovedToBody => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Human-readable description.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EncodingNotSpecified => "document encoding not specified, using default",
            Self::UnsupportedEncodingName => "unsupported IANA encoding name",
            Self::UnknownMarkupDeclaration => "skipping unknown markup declaration",
            Self::EofInMarkupBracket => "end of input in markup bracket",
            Self::EntityMissingSemicolon => "entity reference without terminating semicolon",
            Self::InvalidCharacterReference => "invalid character reference",
            Self::UnknownEntity => "unknown entity reference",
            Self::UnexpectedEof => "unexpected end of input",
            Self::ProcessingInstruction => "processing instruction in HTML document",
            Self::StartTagNameNotLetter => "start tag name does not begin with a letter",
            Self::UnsupportedCharset => "charset is not supported",
            Self::MissingAttributeName => "missing attribute name",
            Self::MissingEndTagName => "missing end tag name",
            Self::AttributeNotSeparated => "attribute not separated by whitespace",
            Self::MissingDoctypeRoot => "missing doctype root element name",
            Self::IncompatibleEncodingChange => "incompatible encoding change",
            Self::EmptyDocument => "empty document",
            Self::UnclosedElement => "end of input with unclosed element",
            Self::ParentForcedBeforeRoot => "element forced its preferred parent before the root",
            Self::ParentForced => "element forced a missing natural parent",
            Self::ImplicitClose => "element implicitly closes an open element",
            Self::BodyForced => "body element forced",
            Self::IntermediateClosed => "end tag closes intermediate element",
            Self::InlineReopened => "inline element reopened",
            Self::ContentMovedToBody => "content in head or html moved into body",
            Self::DoctypeAfterRoot => "doctype after root element",
            Self::DuplicateDoctype => "duplicate doctype",
        }
    }

    /// Build a diagnostic for `component` with positional arguments.
    #[must_use]
    pub fn diagnostic(self, component: &'static str, args: &[&str]) -> Diagnostic {
        let mut message = self.message().to_string();
        if !args.is_empty() {
            message.push_str(": ");
            message.push_str(&args.join(", "));
        }
        Diagnostic {
            component,
            key: self.key(),
            severity: self.severity(),
            message,
            args: args.iter().map(|arg| (*arg).to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_carries_key_and_args() {
        let diagnostic = MessageKey::UnknownEntity.diagnostic("Scanner", &["bogus"]);
        assert_eq!(diagnostic.key, "HTML1006");
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.message, "unknown entity reference: bogus");
        assert_eq!(diagnostic.simple_format(), "quokka/html#HTML1006\tbogus");
    }

    #[test]
    fn test_severities() {
        assert_eq!(MessageKey::EmptyDocument.severity(), Severity::Error);
        assert_eq!(MessageKey::ImplicitClose.severity(), Severity::Warning);
    }
}
