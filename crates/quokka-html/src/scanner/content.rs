//! The content scanner: text, references, tags, comments and declarations.

use super::helpers::{Literal, is_space, reduce_to_content};
use super::special::SpecialElement;
use super::{HtmlScanner, Scan, ScannerState};
use crate::catalog::{self, ElementCode};
use crate::entities;
use crate::error::Result;
use crate::event::{Attribute, ScanEvent, attribute_value};
use crate::messages::MessageKey;

/// Longest reference name scanned after `&`.
const MAX_ENTITY_NAME: usize = 64;

/// A scanned `&...` reference.
pub(super) struct EntityRef {
    /// Text as written, including `&` and any `;`.
    raw: String,
    /// Decoded character, if the reference was valid.
    value: Option<char>,
}

impl EntityRef {
    /// Append the decoded character, or the raw text when it did not decode.
    fn append_to(&self, out: &mut String) {
        match self.value {
            Some(c) => out.push(c),
            None => out.push_str(&self.raw),
        }
    }
}

/// Outcome of scanning one start tag.
enum TagScan {
    /// `<` was not followed by a name; it was emitted as text.
    NotATag,
    /// A start tag; `empty` when it ended with `/>`.
    Tag { name: String, empty: bool },
    /// Input ended inside the tag.
    Eof,
}

/// Outcome of scanning one attribute.
enum AttrScan {
    /// Another attribute may follow.
    More,
    /// The tag is closed.
    Done,
    /// Input ended inside the tag.
    Eof,
}

fn is_entity_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '#')
}

/// Charset named by a `<meta>` tag, if any.
fn meta_charset(attributes: &[Attribute]) -> Option<String> {
    if let Some(charset) = attribute_value(attributes, "charset") {
        return Some(charset.to_string());
    }
    let http_equiv = attribute_value(attributes, "http-equiv")?;
    if !http_equiv.eq_ignore_ascii_case("content-type") {
        return None;
    }
    let content: String = attribute_value(attributes, "content")?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let index = content.to_ascii_lowercase().find("charset=")?;
    content[index + "charset=".len()..]
        .split(';')
        .next()
        .map(str::to_string)
}

// =============================================================================
// Content state
// =============================================================================

impl HtmlScanner {
    pub(super) fn scan_content(&mut self) -> Result<Scan> {
        self.begin = self.entity.position();
        match self.entity.peek(0)? {
            None => Ok(Scan::Eof),
            Some('<') => {
                let _ = self.entity.read()?;
                self.state = ScannerState::MarkupBracket;
                Ok(Scan::More)
            }
            Some('&') => {
                let _ = self.entity.read()?;
                let _ = self.scan_entity_ref(true)?;
                Ok(Scan::More)
            }
            Some(_) => {
                self.scan_characters()?;
                Ok(Scan::More)
            }
        }
    }

    /// Text up to the next `<` or `&`, with line breaks folded to `\n`.
    fn scan_characters(&mut self) -> Result<()> {
        let mut text = String::new();
        while let Some(c) = self.entity.peek(0)? {
            match c {
                '<' | '&' => break,
                '\r' | '\n' => {
                    let newlines = self.entity.skip_newlines()?;
                    text.push_str(&"\n".repeat(newlines));
                }
                _ => {
                    let _ = self.entity.read()?;
                    text.push(c);
                }
            }
        }
        if !text.is_empty() {
            self.emit_characters(text);
        }
        Ok(())
    }

    /// Scan a reference after its `&`.
    ///
    /// In content the result is emitted as characters, optionally bracketed
    /// by entity events. In attribute values (`content == false`) nothing is
    /// emitted and the caller uses the returned value.
    pub(super) fn scan_entity_ref(&mut self, content: bool) -> Result<EntityRef> {
        let mut raw = String::from("&");
        let mut terminated = false;
        let mut name_len = 0;
        loop {
            match self.entity.peek(0)? {
                Some(';') => {
                    let _ = self.entity.read()?;
                    raw.push(';');
                    terminated = true;
                    break;
                }
                Some(c) if name_len < MAX_ENTITY_NAME && is_entity_char(c) => {
                    let _ = self.entity.read()?;
                    raw.push(c);
                    name_len += 1;
                }
                _ => break,
            }
        }
        if !terminated {
            self.report(MessageKey::EntityMissingSemicolon, &[]);
        }
        if name_len == 0 && !terminated {
            if content {
                self.emit_characters(raw.clone());
            }
            return Ok(EntityRef { raw, value: None });
        }

        let name = raw[1..raw.len() - usize::from(terminated)].to_string();
        if let Some(number) = name.strip_prefix('#') {
            let Some(value) = self.numeric_reference(number) else {
                self.report(MessageKey::InvalidCharacterReference, &[&name]);
                if content {
                    self.emit_characters(raw.clone());
                }
                return Ok(EntityRef { raw, value: None });
            };
            if content {
                self.emit_reference(&name, value, self.config.notify_char_refs);
            }
            return Ok(EntityRef {
                raw,
                value: Some(value),
            });
        }

        let value = entities::decode(&name);
        // In attribute values only the references old browsers completed
        // without a semicolon are decoded.
        let truncated_in_attribute =
            !content && !terminated && value.is_some_and(|c| u32::from(c) > 256);
        let Some(value) = value.filter(|_| !truncated_in_attribute) else {
            self.report(MessageKey::UnknownEntity, &[&name]);
            if content {
                self.emit_characters(raw.clone());
            }
            return Ok(EntityRef { raw, value: None });
        };
        if content {
            let notify = self.config.notify_html_builtin_refs
                || (self.config.notify_xml_builtin_refs && entities::is_xml_builtin(&name));
            self.emit_reference(&name, value, notify);
        }
        Ok(EntityRef {
            raw,
            value: Some(value),
        })
    }

    /// Decimal or `x`-prefixed hexadecimal character number.
    fn numeric_reference(&self, number: &str) -> Option<char> {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => number.parse::<u32>(),
        }
        .ok()?;
        if self.config.fix_windows_char_refs && self.iso8859 {
            if let Some(c) = entities::windows_1252_remap(code) {
                return Some(c);
            }
        }
        char::from_u32(code).filter(|c| *c != '\0')
    }

    fn emit_reference(&mut self, name: &str, value: char, notify: bool) {
        if notify {
            self.emit(ScanEvent::StartEntity {
                name: name.to_string(),
                location: self.location(),
            });
        }
        self.emit_characters(value.to_string());
        if notify {
            self.emit(ScanEvent::EndEntity {
                name: name.to_string(),
                location: self.location(),
            });
        }
    }
}

// =============================================================================
// Markup bracket state
// =============================================================================

impl HtmlScanner {
    pub(super) fn scan_markup_bracket(&mut self) -> Result<Scan> {
        let scan = match self.entity.read()? {
            Some('!') => {
                if self.skip("--", false)? {
                    self.scan_comment()?
                } else if self.skip("[CDATA[", false)? {
                    self.scan_cdata()?
                } else if self.skip("DOCTYPE", false)? {
                    self.scan_doctype()?
                } else {
                    self.report(MessageKey::UnknownMarkupDeclaration, &[]);
                    let _ = self.skip_markup(true)?;
                    Scan::More
                }
            }
            Some('?') => self.scan_pi()?,
            Some('/') => self.scan_end_element()?,
            None => {
                self.report(MessageKey::EofInMarkupBracket, &[]);
                self.emit(ScanEvent::Characters {
                    text: "<".to_string(),
                    location: None,
                });
                Scan::Eof
            }
            Some(_) => {
                self.entity.rewind(1);
                self.element_count += 1;
                self.scan_start_tag()?
            }
        };
        if scan == Scan::More && self.state == ScannerState::MarkupBracket {
            self.state = ScannerState::Content;
        }
        Ok(scan)
    }

    /// Scan a start tag and decide how its content is scanned.
    fn scan_start_tag(&mut self) -> Result<Scan> {
        let (name, empty) = match self.scan_start_element()? {
            TagScan::Eof => return Ok(Scan::Eof),
            TagScan::NotATag => return Ok(Scan::More),
            TagScan::Tag { name, empty } => (name, empty),
        };
        self.begin = self.entity.position();
        self.state = ScannerState::Content;
        if name.eq_ignore_ascii_case("script") {
            self.scan_script_content()?;
        } else if !self.config.parse_noscript_content && name.eq_ignore_ascii_case("noscript") {
            self.scan_raw_text("noscript")?;
        } else if !self.config.parse_noframes_content && name.eq_ignore_ascii_case("noframes") {
            self.scan_raw_text("noframes")?;
        } else if !empty
            && catalog::lookup(&name).is_special()
            && (!name.eq_ignore_ascii_case("title") || self.is_ended(&name)?)
        {
            log::trace!(target: "quokka::scanner", "raw text mode for <{name}>");
            self.special = Some(SpecialElement::new(&name));
        }
        Ok(Scan::More)
    }

    fn scan_start_element(&mut self) -> Result<TagScan> {
        let raw_name = match self.scan_name()? {
            Some(name) if name.starts_with(|c: char| c.is_ascii_alphabetic()) => name,
            partial => {
                self.report(MessageKey::StartTagNameNotLetter, &[]);
                let mut text = String::from("<");
                if let Some(partial) = partial {
                    text.push_str(&partial);
                }
                self.emit(ScanEvent::Characters {
                    text,
                    location: None,
                });
                return Ok(TagScan::NotATag);
            }
        };
        let name = self.config.names_elems.apply(&raw_name);

        let begin = self.begin;
        let mut attributes = Vec::new();
        let mut empty = false;
        loop {
            match self.scan_attribute(&mut attributes, &mut empty, '/')? {
                AttrScan::More => {}
                AttrScan::Done => break,
                AttrScan::Eof => return Ok(TagScan::Eof),
            }
        }
        self.begin = begin;

        if self.can_sniff_charset() {
            self.sniff_charset(&name, &attributes);
        }

        let location = self.location();
        let event = if empty {
            ScanEvent::EmptyElement {
                name: name.clone(),
                attributes,
                location,
            }
        } else {
            ScanEvent::StartElement {
                name: name.clone(),
                attributes,
                location,
            }
        };
        self.emit(event);
        Ok(TagScan::Tag { name, empty })
    }

    /// Switch encodings on a `<meta>` charset; stop recording once the body
    /// has started.
    fn sniff_charset(&mut self, name: &str, attributes: &[Attribute]) {
        if name.eq_ignore_ascii_case("meta") {
            if let Some(charset) = meta_charset(attributes) {
                if !self.config.ignore_specified_charset {
                    let _ = self.change_encoding(&charset);
                }
            }
        } else if name.eq_ignore_ascii_case("body")
            || catalog::lookup(name).parents.first() == Some(&ElementCode::Body)
        {
            self.clear_playback();
        }
    }

    fn attribute(&self, name: String, value: String, raw: String) -> Attribute {
        Attribute {
            name,
            value,
            non_normalized_value: raw,
            location: self.location(),
        }
    }

    /// Scan one attribute of a start tag or XML declaration. `endc` is the
    /// character allowed right before the closing `>`.
    fn scan_attribute(
        &mut self,
        attributes: &mut Vec<Attribute>,
        empty: &mut bool,
        endc: char,
    ) -> Result<AttrScan> {
        let separated = self.skip_spaces()?;
        self.begin = self.entity.position();
        match self.entity.peek(0)? {
            None => {
                self.report(MessageKey::UnexpectedEof, &[]);
                return Ok(AttrScan::Done);
            }
            Some('>') => {
                let _ = self.entity.read()?;
                return Ok(AttrScan::Done);
            }
            Some('<') => return Ok(AttrScan::Done),
            Some(_) => {}
        }

        let Some(raw_name) = self.scan_name()? else {
            if self.entity.peek(0)? != Some(endc) {
                self.report(MessageKey::MissingAttributeName, &[]);
            }
            *empty = self.skip_markup(false)?;
            return Ok(AttrScan::Done);
        };
        if !separated {
            self.report(MessageKey::AttributeNotSeparated, &[&raw_name]);
        }
        let name = self.config.names_attrs.apply(&raw_name);

        let _ = self.skip_spaces()?;
        match self.entity.read()? {
            None => {
                self.report(MessageKey::UnexpectedEof, &[]);
                return Ok(AttrScan::Eof);
            }
            Some(c @ ('/' | '>')) => {
                attributes.push(self.attribute(name, String::new(), String::new()));
                if c == '/' {
                    self.entity.rewind(1);
                    *empty = self.skip_markup(false)?;
                }
                return Ok(AttrScan::Done);
            }
            Some('=') => {}
            Some(_) => {
                self.entity.rewind(1);
                attributes.push(self.attribute(name, String::new(), String::new()));
                return Ok(AttrScan::More);
            }
        }

        let _ = self.skip_spaces()?;
        let quote = match self.entity.read()? {
            None => {
                self.report(MessageKey::UnexpectedEof, &[]);
                return Ok(AttrScan::Eof);
            }
            Some('>') => {
                attributes.push(self.attribute(name, String::new(), String::new()));
                return Ok(AttrScan::Done);
            }
            Some(quote @ ('\'' | '"')) => quote,
            Some(_) => {
                self.entity.rewind(1);
                return match self.scan_unquoted_value()? {
                    Some((value, raw)) => {
                        attributes.push(self.attribute(name, value, raw));
                        Ok(AttrScan::More)
                    }
                    None => Ok(AttrScan::Eof),
                };
            }
        };
        let (value, raw) = self.scan_quoted_value(quote)?;
        attributes.push(self.attribute(name, value, raw));
        Ok(AttrScan::More)
    }

    /// Value running to whitespace or `>`. `None` when input ends first.
    fn scan_unquoted_value(&mut self) -> Result<Option<(String, String)>> {
        let mut value = String::new();
        let mut raw = String::new();
        loop {
            match self.entity.peek(0)? {
                None => {
                    self.report(MessageKey::UnexpectedEof, &[]);
                    return Ok(None);
                }
                Some(c) if is_space(c) || c == '>' => break,
                Some('&') => {
                    let _ = self.entity.read()?;
                    let reference = self.scan_entity_ref(false)?;
                    reference.append_to(&mut value);
                    raw.push_str(&reference.raw);
                }
                Some(c) => {
                    let _ = self.entity.read()?;
                    value.push(c);
                    raw.push(c);
                }
            }
        }
        Ok(Some((value, raw)))
    }

    /// Value up to the closing `quote`, or to the end of input.
    fn scan_quoted_value(&mut self, quote: char) -> Result<(String, String)> {
        let normalize = self.config.normalize_attributes;
        let mut value = String::new();
        let mut raw = String::new();
        let mut at_start = true;
        let mut after_space = false;
        loop {
            let accept_space = !normalize || (!at_start && !after_space);
            let Some(c) = self.entity.read()? else {
                self.report(MessageKey::UnexpectedEof, &[]);
                break;
            };
            match c {
                _ if c == quote => break,
                '&' => {
                    let reference = self.scan_entity_ref(false)?;
                    reference.append_to(&mut value);
                    raw.push_str(&reference.raw);
                }
                ' ' | '\t' => {
                    if accept_space {
                        value.push(if normalize { ' ' } else { c });
                    }
                    raw.push(c);
                }
                '\r' | '\n' => {
                    let mut newline = c;
                    if c == '\r' && self.entity.peek(0)? == Some('\n') {
                        let _ = self.entity.read()?;
                        raw.push('\r');
                        newline = '\n';
                    }
                    if accept_space {
                        value.push(if normalize { ' ' } else { '\n' });
                    }
                    self.entity.inc_line();
                    raw.push(newline);
                }
                _ => {
                    value.push(c);
                    raw.push(c);
                }
            }
            after_space = matches!(c, ' ' | '\t' | '\r' | '\n');
            at_start = at_start && after_space;
        }
        if normalize && value.ends_with(' ') {
            let _ = value.pop();
        }
        Ok((value, raw))
    }

    fn scan_end_element(&mut self) -> Result<Scan> {
        let name = self.scan_name()?;
        if name.is_none() {
            self.report(MessageKey::MissingEndTagName, &[]);
        }
        let _ = self.skip_markup(false)?;
        if let Some(name) = name {
            let name = self.config.names_elems.apply(&name);
            self.emit(ScanEvent::EndElement {
                name,
                location: self.location(),
            });
        }
        Ok(Scan::More)
    }
}

// =============================================================================
// Comments, CDATA, processing instructions and doctypes
// =============================================================================

impl HtmlScanner {
    /// Scan a comment after `<!--`.
    ///
    /// Without a closing `-->`, the comment ends at the first `>` instead and
    /// the text after it is scanned again as markup.
    fn scan_comment(&mut self) -> Result<Scan> {
        let start = self.entity.position();
        let mut text = String::new();
        if !self.scan_markup_content(&mut text, '-')? {
            self.emit(ScanEvent::Comment {
                text,
                location: self.location(),
            });
            return Ok(Scan::More);
        }

        self.entity.reset_buffer(&text, start);
        text.clear();
        let mut closed = false;
        while let Some(c) = self.entity.read()? {
            if c == '>' {
                closed = true;
                break;
            }
            text.push(c);
        }
        if !closed {
            self.report(MessageKey::UnexpectedEof, &[]);
        }
        self.emit(ScanEvent::Comment {
            text,
            location: self.location(),
        });
        Ok(if closed { Scan::More } else { Scan::Eof })
    }

    /// Collect text up to `cend cend >` (at least two `cend`). Returns `true`
    /// when input ended first.
    fn scan_markup_content(&mut self, text: &mut String, cend: char) -> Result<bool> {
        loop {
            let Some(c) = self.entity.read()? else {
                self.report(MessageKey::UnexpectedEof, &[]);
                return Ok(true);
            };
            if c == cend {
                let mut count = 1;
                let next = loop {
                    match self.entity.read()? {
                        Some(next) if next == cend => count += 1,
                        other => break other,
                    }
                };
                let Some(next) = next else {
                    self.report(MessageKey::UnexpectedEof, &[]);
                    return Ok(true);
                };
                if count < 2 || next != '>' {
                    for _ in 0..count {
                        text.push(cend);
                    }
                    self.entity.rewind(1);
                    continue;
                }
                for _ in 2..count {
                    text.push(cend);
                }
                return Ok(false);
            }
            if c == '\r' || c == '\n' {
                self.entity.rewind(1);
                let newlines = self.entity.skip_newlines()?;
                text.push_str(&"\n".repeat(newlines));
                continue;
            }
            text.push(c);
        }
    }

    fn scan_cdata(&mut self) -> Result<Scan> {
        let sections = self.config.cdata_sections;
        let mut text = String::new();
        if sections {
            self.emit(ScanEvent::StartCData {
                location: self.location(),
            });
        } else {
            text.push_str("[CDATA[");
        }
        let eof = self.scan_markup_content(&mut text, ']')?;
        if sections {
            if !text.is_empty() {
                self.emit_characters(text);
            }
            self.emit(ScanEvent::EndCData {
                location: self.location(),
            });
        } else {
            text.push_str("]]");
            self.emit(ScanEvent::Comment {
                text,
                location: self.location(),
            });
        }
        Ok(if eof { Scan::Eof } else { Scan::More })
    }

    /// Scan `<?target data?>`, or an XML declaration when the target is
    /// `xml` or missing.
    fn scan_pi(&mut self) -> Result<Scan> {
        self.report(MessageKey::ProcessingInstruction, &[]);
        let target = self.scan_name()?;
        if let Some(target) = target.filter(|target| !target.eq_ignore_ascii_case("xml")) {
            loop {
                match self.entity.peek(0)? {
                    Some('\r' | '\n') => {
                        let _ = self.entity.skip_newlines()?;
                    }
                    Some(' ' | '\t') => {
                        let _ = self.entity.read()?;
                    }
                    _ => break,
                }
            }
            let mut data = String::new();
            loop {
                match self.entity.read()? {
                    None => break,
                    Some(c @ ('?' | '/')) => {
                        if self.entity.peek(0)? == Some('>') {
                            let _ = self.entity.read()?;
                            break;
                        }
                        data.push(c);
                    }
                    Some('\r' | '\n') => {
                        self.entity.rewind(1);
                        let newlines = self.entity.skip_newlines()?;
                        data.push_str(&"\n".repeat(newlines));
                    }
                    Some(c) => data.push(c),
                }
            }
            self.emit(ScanEvent::ProcessingInstruction {
                target,
                data,
                location: self.location(),
            });
            return Ok(Scan::More);
        }

        let begin = self.begin;
        let mut attributes = Vec::new();
        let mut empty = false;
        loop {
            match self.scan_attribute(&mut attributes, &mut empty, '?')? {
                AttrScan::More => {}
                AttrScan::Done => break,
                AttrScan::Eof => return Ok(Scan::Eof),
            }
        }
        attributes.retain(|attribute| !attribute.value.is_empty());
        for attribute in &mut attributes {
            attribute.name = attribute.name.to_lowercase();
        }
        let pseudo = |name: &str| attribute_value(&attributes, name).map(str::to_string);
        let version = pseudo("version");
        let encoding = pseudo("encoding");
        let standalone = pseudo("standalone");

        // After a successful switch the declaration is scanned again and
        // reported on the replay.
        let replaying = !self.config.ignore_specified_charset
            && encoding
                .as_deref()
                .is_some_and(|charset| self.change_encoding(charset));
        if !replaying {
            self.begin = begin;
            self.emit(ScanEvent::XmlDecl {
                version,
                encoding,
                standalone,
                location: self.location(),
            });
        }
        Ok(Scan::More)
    }

    /// Scan a doctype after `<!DOCTYPE`.
    fn scan_doctype(&mut self) -> Result<Scan> {
        let mut root = None;
        let mut public_id = None;
        let mut system_id = None;

        if self.skip_spaces()? {
            match self.scan_name()? {
                Some(name) => root = Some(self.config.names_elems.apply(&name)),
                None => self.report(MessageKey::MissingDoctypeRoot, &[]),
            }
            if self.skip_spaces()? {
                if self.skip("PUBLIC", false)? {
                    let _ = self.skip_spaces()?;
                    match self.scan_literal()? {
                        Literal::Eof => return Ok(Scan::Eof),
                        Literal::Value(value) => public_id = Some(value),
                        Literal::Absent => {}
                    }
                    if self.skip_spaces()? {
                        match self.scan_literal()? {
                            Literal::Eof => return Ok(Scan::Eof),
                            Literal::Value(value) => system_id = Some(value),
                            Literal::Absent => {}
                        }
                    }
                } else if self.skip("SYSTEM", false)? {
                    let _ = self.skip_spaces()?;
                    match self.scan_literal()? {
                        Literal::Eof => return Ok(Scan::Eof),
                        Literal::Value(value) => system_id = Some(value),
                        Literal::Absent => {}
                    }
                }
            }
        }

        while let Some(c) = self.entity.read()? {
            match c {
                '<' => {
                    self.entity.rewind(1);
                    break;
                }
                '>' => break,
                '[' => {
                    let _ = self.skip_markup(true)?;
                    break;
                }
                _ => {}
            }
        }

        if self.config.override_doctype {
            public_id = Some(self.config.doctype_public_id.clone());
            system_id = Some(self.config.doctype_system_id.clone());
        }
        self.emit(ScanEvent::Doctype {
            root,
            public_id,
            system_id,
            location: self.location(),
        });
        Ok(Scan::More)
    }
}

// =============================================================================
// Raw text after SCRIPT, NOSCRIPT and NOFRAMES
// =============================================================================

impl HtmlScanner {
    /// Copy script text verbatim up to `</script>`.
    ///
    /// Inside `<!--`, a `</script>` does not end the script while a `-->` is
    /// still ahead.
    fn scan_script_content(&mut self) -> Result<()> {
        let mut text = String::new();
        let mut in_comment = false;
        while let Some(c) = self.entity.read()? {
            if c == '-' && text.ends_with("<!-") {
                in_comment = self.end_comment_available()?;
            } else if !in_comment && c == '<' {
                if self.end_tag_follows("script")? {
                    self.entity.rewind(1);
                    break;
                }
            } else if c == '>' && text.ends_with("--") {
                in_comment = false;
            }

            if c == '\r' || c == '\n' {
                self.entity.rewind(1);
                let newlines = self.entity.skip_newlines()?;
                text.push_str(&"\n".repeat(newlines));
            } else {
                text.push(c);
            }
        }
        if self.config.script_strip_comment_delims {
            reduce_to_content(&mut text, "<!--", "-->");
        }
        if self.config.script_strip_cdata_delims {
            reduce_to_content(&mut text, "<![CDATA[", "]]>");
        }
        if !text.is_empty() {
            self.emit_characters(text);
        }
        Ok(())
    }

    /// Copy text verbatim up to `</name>`.
    fn scan_raw_text(&mut self, name: &str) -> Result<()> {
        let mut text = String::new();
        while let Some(c) = self.entity.read()? {
            if c == '<' && self.end_tag_follows(name)? {
                self.entity.rewind(1);
                break;
            }
            if c == '\r' || c == '\n' {
                self.entity.rewind(1);
                let newlines = self.entity.skip_newlines()?;
                text.push_str(&"\n".repeat(newlines));
            } else {
                text.push(c);
            }
        }
        if !text.is_empty() {
            self.emit_characters(text);
        }
        Ok(())
    }
}
