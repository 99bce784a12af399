//! Character-level helpers shared by the content and special scanners.

use super::HtmlScanner;
use crate::error::Result;
use crate::messages::MessageKey;

/// Whitespace as the scanner sees it: Unicode white space minus the
/// non-breaking spaces.
pub(crate) fn is_space(c: char) -> bool {
    c.is_whitespace() && !matches!(c, '\u{A0}' | '\u{2007}' | '\u{202F}')
}

/// Characters allowed in element, attribute and doctype names.
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '.' | ':' | '_')
}

/// Replace `text` with what lies between `start` and `end` when only
/// whitespace surrounds the pair.
pub(super) fn reduce_to_content(text: &mut String, start: &str, end: &str) {
    let inner = text
        .trim_matches(is_space)
        .strip_prefix(start)
        .and_then(|rest| rest.strip_suffix(end))
        .map(str::to_string);
    if let Some(inner) = inner {
        *text = inner;
    }
}

/// A quoted literal in a doctype.
pub(super) enum Literal {
    /// No opening quote.
    Absent,
    /// Text between the quotes.
    Value(String),
    /// Input ended inside the literal.
    Eof,
}

// =============================================================================
// Names and literals
// =============================================================================

impl HtmlScanner {
    /// Scan a name, or return `None` when the next character cannot start one.
    pub(super) fn scan_name(&mut self) -> Result<Option<String>> {
        let mut name = String::new();
        while let Some(c) = self.entity.peek(0)? {
            if !is_name_char(c) {
                break;
            }
            let _ = self.entity.read()?;
            name.push(c);
        }
        Ok((!name.is_empty()).then_some(name))
    }

    /// Scan a quoted literal. Line breaks inside it become single spaces; an
    /// unquoted `<` ends it early.
    pub(super) fn scan_literal(&mut self) -> Result<Literal> {
        let quote = match self.entity.peek(0)? {
            Some(quote @ ('\'' | '"')) => quote,
            _ => return Ok(Literal::Absent),
        };
        let _ = self.entity.read()?;
        let mut text = String::new();
        loop {
            match self.entity.peek(0)? {
                None => {
                    self.report(MessageKey::UnexpectedEof, &[]);
                    return Ok(Literal::Eof);
                }
                Some('\r' | '\n') => {
                    let _ = self.entity.skip_newlines()?;
                    text.push(' ');
                }
                Some('<') => break,
                Some(c) => {
                    let _ = self.entity.read()?;
                    if c == quote {
                        break;
                    }
                    text.push(c);
                }
            }
        }
        Ok(Literal::Value(text))
    }
}

// =============================================================================
// Skipping
// =============================================================================

impl HtmlScanner {
    /// Consume `s` if the input continues with it.
    pub(super) fn skip(&mut self, s: &str, case_sensitive: bool) -> Result<bool> {
        let len = s.chars().count();
        let ahead = self.entity.next_content(len)?;
        let matched = if case_sensitive {
            ahead == s
        } else {
            ahead.eq_ignore_ascii_case(s)
        };
        if matched {
            for _ in 0..len {
                let _ = self.entity.read()?;
            }
        }
        Ok(matched)
    }

    /// Consume whitespace, counting line breaks. Returns whether any was
    /// skipped.
    pub(super) fn skip_spaces(&mut self) -> Result<bool> {
        let mut skipped = false;
        loop {
            match self.entity.peek(0)? {
                Some('\r' | '\n') => {
                    let _ = self.entity.skip_newlines()?;
                }
                Some(c) if is_space(c) => {
                    let _ = self.entity.read()?;
                }
                _ => break,
            }
            skipped = true;
        }
        Ok(skipped)
    }

    /// Skip to the `>` that closes the current markup. With `balance`, nested
    /// `<` ... `>` pairs are skipped whole.
    ///
    /// Returns whether a `/>` was seen.
    pub(super) fn skip_markup(&mut self, balance: bool) -> Result<bool> {
        let mut depth = 1;
        let mut slash_gt = false;
        loop {
            match self.entity.peek(0)? {
                None => break,
                Some('\r' | '\n') => {
                    let _ = self.entity.skip_newlines()?;
                    continue;
                }
                Some(_) => {}
            }
            match self.entity.read()? {
                Some('<') if balance => depth += 1,
                Some('>') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some('/') => {
                    if self.entity.peek(0)? == Some('>') {
                        let _ = self.entity.read()?;
                        slash_gt = true;
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(slash_gt)
    }
}

// =============================================================================
// Lookahead
// =============================================================================

impl HtmlScanner {
    /// Whether `/name` followed by `>` or whitespace (or the end of input)
    /// comes next. The `<` must already be consumed.
    pub(super) fn end_tag_follows(&mut self, name: &str) -> Result<bool> {
        let len = name.chars().count() + 2;
        let mut ahead: Vec<char> = self.entity.next_content(len)?.chars().collect();
        ahead.push(' ');
        if ahead.len() < len {
            return Ok(false);
        }
        let tag: String = ahead[..len - 1].iter().collect();
        let after = ahead[len - 1];
        Ok(tag.strip_prefix('/')
            .is_some_and(|tag| tag.eq_ignore_ascii_case(name))
            && (after == '>' || is_space(after)))
    }

    /// Whether a `-->` appears anywhere ahead. Nothing is consumed.
    pub(super) fn end_comment_available(&mut self) -> Result<bool> {
        let mark = self.entity.mark();
        let mut dashes = 0;
        let found = loop {
            match self.entity.read()? {
                None => break false,
                Some('>') if dashes >= 2 => break true,
                Some('-') => dashes += 1,
                Some(_) => dashes = 0,
            }
        };
        self.entity.reset(mark);
        Ok(found)
    }

    /// Whether `</name>` is visible in the already decoded input.
    pub(super) fn is_ended(&mut self, name: &str) -> Result<bool> {
        const WINDOW: usize = 2048;
        let ahead = self.entity.buffered_remainder(WINDOW)?.to_lowercase();
        Ok(ahead.contains(&format!("</{}>", name.to_lowercase())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_to_content() {
        let mut text = String::from("\n  <!-- body { } -->\n");
        reduce_to_content(&mut text, "<!--", "-->");
        assert_eq!(text, " body { } ");

        let mut text = String::from("x <!-- a -->");
        reduce_to_content(&mut text, "<!--", "-->");
        assert_eq!(text, "x <!-- a -->");

        let mut text = String::from("<![CDATA[a]]>");
        reduce_to_content(&mut text, "<![CDATA[", "]]>");
        assert_eq!(text, "a");
    }

    #[test]
    fn test_nbsp_is_not_space() {
        assert!(is_space('\t'));
        assert!(is_space('\u{3000}'));
        assert!(!is_space('\u{A0}'));
    }
}
