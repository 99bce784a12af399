//! Raw-text scanning for SPECIAL elements.
//!
//! Inside STYLE, TEXTAREA, TITLE, XMP, PLAINTEXT and COMMENT, markup is not
//! recognized; only the element's own end tag ends the content. TEXTAREA and
//! TITLE still decode character references.

use super::helpers::reduce_to_content;
use super::{HtmlScanner, Scan, ScannerState};
use crate::error::Result;
use crate::event::ScanEvent;
use crate::messages::MessageKey;

/// The SPECIAL element whose content is being scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SpecialElement {
    name: String,
    style: bool,
    decode_entities: bool,
}

impl SpecialElement {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            style: name.eq_ignore_ascii_case("style"),
            decode_entities: name.eq_ignore_ascii_case("textarea")
                || name.eq_ignore_ascii_case("title"),
        }
    }
}

impl HtmlScanner {
    pub(super) fn scan_special_content(&mut self) -> Result<Scan> {
        self.begin = self.entity.position();
        let decode_entities = self
            .special
            .as_ref()
            .is_some_and(|special| special.decode_entities);
        let mut text = String::new();
        match self.entity.read()? {
            Some('<') => {
                self.state = ScannerState::MarkupBracket;
                return Ok(Scan::More);
            }
            Some('&') => {
                if decode_entities {
                    let _ = self.scan_entity_ref(true)?;
                    return Ok(Scan::More);
                }
                text.push('&');
            }
            None => {
                self.report(MessageKey::UnexpectedEof, &[]);
                return Ok(Scan::Eof);
            }
            Some(_) => self.entity.rewind(1),
        }
        self.scan_special_characters(text)?;
        Ok(Scan::More)
    }

    pub(super) fn scan_special_bracket(&mut self) -> Result<Scan> {
        let element = self
            .special
            .as_ref()
            .map(|special| special.name.clone())
            .unwrap_or_default();
        let mut text = String::new();
        match self.entity.read()? {
            Some('/') => match self.scan_name()? {
                Some(name) => {
                    if name.eq_ignore_ascii_case(&element) && self.entity.peek(0)? == Some('>') {
                        let _ = self.entity.read()?;
                        let name = self.config.names_elems.apply(&name);
                        self.emit(ScanEvent::EndElement {
                            name,
                            location: self.location(),
                        });
                        log::trace!(target: "quokka::scanner", "leaving raw text mode for <{element}>");
                        self.special = None;
                        self.state = ScannerState::Content;
                        return Ok(Scan::More);
                    }
                    text.push_str("</");
                    text.push_str(&name);
                }
                None => text.push_str("</"),
            },
            Some('\r' | '\n') => {
                self.entity.rewind(1);
                text.push('<');
            }
            Some(c) => {
                text.push('<');
                text.push(c);
            }
            None => text.push('<'),
        }
        self.scan_special_characters(text)?;
        self.state = ScannerState::Content;
        Ok(Scan::More)
    }

    /// Text up to the next `<` or `&`, appended to `text` and emitted.
    fn scan_special_characters(&mut self, mut text: String) -> Result<()> {
        loop {
            match self.entity.peek(0)? {
                None | Some('<' | '&') => break,
                Some('\r' | '\n') => {
                    let newlines = self.entity.skip_newlines()?;
                    text.push_str(&"\n".repeat(newlines));
                }
                Some(c) => {
                    let _ = self.entity.read()?;
                    text.push(c);
                }
            }
        }
        if self.special.as_ref().is_some_and(|special| special.style) {
            if self.config.style_strip_comment_delims {
                reduce_to_content(&mut text, "<!--", "-->");
            }
            if self.config.style_strip_cdata_delims {
                reduce_to_content(&mut text, "<![CDATA[", "]]>");
            }
        }
        if !text.is_empty() {
            self.emit_characters(text);
        }
        Ok(())
    }
}
