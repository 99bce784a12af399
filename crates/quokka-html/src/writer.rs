//! Serializing events back to HTML.

use std::fmt::{self, Write};

use crate::catalog;
use crate::entities;
use crate::event::{Attribute, Location};
use crate::sink::EventSink;

/// Sink that prints the events it receives as HTML.
///
/// Text outside raw-text elements is escaped through the entity table, so
/// `<`, `&` and every other character with an entity name come out as
/// references. Attribute values are always double-quoted. A
/// `<meta http-equiv="Content-Type">` has its charset rewritten to the
/// output encoding.
///
/// Write failures are remembered and returned by [`HtmlWriter::finish`].
#[derive(Debug)]
pub struct HtmlWriter<W> {
    out: W,
    encoding: String,
    seen_root: bool,
    depth: usize,
    escape_text: bool,
    print_chars: bool,
    error: Option<fmt::Error>,
}

impl<W: Write> HtmlWriter<W> {
    /// Print into `out`, declaring `encoding` in content-type metas.
    pub fn new(out: W, encoding: impl Into<String>) -> Self {
        Self {
            out,
            encoding: encoding.into(),
            seen_root: false,
            depth: 0,
            escape_text: true,
            print_chars: true,
            error: None,
        }
    }

    /// The output so far.
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    /// Consume the writer, returning the output or the first write error.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failed write.
    pub fn finish(self) -> Result<W, fmt::Error> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.out),
        }
    }

    fn print(&mut self, s: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.out.write_str(s) {
            self.error = Some(error);
        }
    }

    fn print_char(&mut self, c: char) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.out.write_char(c) {
            self.error = Some(error);
        }
    }

    fn print_entity(&mut self, name: &str) {
        self.print_char('&');
        self.print(name);
        self.print_char(';');
    }

    fn print_text(&mut self, text: &str, escape: bool) {
        if !escape {
            self.print(text);
            return;
        }
        for c in text.chars() {
            match entities::encode(c) {
                Some(name) if c != '\n' => self.print_entity(name),
                _ => self.print_char(c),
            }
        }
    }

    fn print_attribute_value(&mut self, value: &str) {
        for c in value.chars() {
            if c == '"' {
                self.print("&quot;");
            } else {
                self.print_char(c);
            }
        }
    }

    fn print_start_tag(&mut self, name: &str, attributes: &[Attribute]) {
        let charset_index = if name.eq_ignore_ascii_case("meta") {
            content_type_index(attributes)
        } else {
            None
        };
        self.print_char('<');
        self.print(name);
        for (index, attribute) in attributes.iter().enumerate() {
            self.print_char(' ');
            self.print(&attribute.name);
            self.print("=\"");
            if Some(index) == charset_index {
                let content = with_charset(&attribute.value, &self.encoding);
                self.print_attribute_value(&content);
            } else {
                self.print_attribute_value(&attribute.value);
            }
            self.print_char('"');
        }
        self.print_char('>');
    }
}

/// Index of the `content` attribute of a content-type meta.
fn content_type_index(attributes: &[Attribute]) -> Option<usize> {
    let mut http_equiv = None;
    let mut content = None;
    for (index, attribute) in attributes.iter().enumerate() {
        if attribute.name.eq_ignore_ascii_case("http-equiv") {
            http_equiv = Some(attribute.value.as_str());
        } else if attribute.name.eq_ignore_ascii_case("content") {
            content = Some(index);
        }
    }
    http_equiv
        .filter(|value| value.eq_ignore_ascii_case("content-type"))
        .and(content)
}

/// `content` with its charset parameter replaced by `encoding`.
fn with_charset(content: &str, encoding: &str) -> String {
    let mut content = content.to_lowercase();
    match content.find("charset=") {
        Some(index) => content.truncate(index + "charset=".len()),
        None => content.push_str(";charset="),
    }
    content.push_str(encoding);
    content
}

impl<W: Write> EventSink for HtmlWriter<W> {
    fn start_document(&mut self, _location: Option<Location>) {
        self.seen_root = false;
        self.depth = 0;
        self.escape_text = true;
        self.print_chars = true;
    }

    fn doctype(
        &mut self,
        root: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        _location: Option<Location>,
    ) {
        self.print("<!DOCTYPE");
        if let Some(root) = root {
            self.print_char(' ');
            self.print(&root);
        }
        match (public_id, system_id) {
            (Some(public_id), system_id) => {
                self.print(&format!(" PUBLIC \"{public_id}\""));
                if let Some(system_id) = system_id {
                    self.print(&format!(" \"{system_id}\""));
                }
            }
            (None, Some(system_id)) => self.print(&format!(" SYSTEM \"{system_id}\"")),
            (None, None) => {}
        }
        self.print(">\n");
    }

    fn start_element(&mut self, name: String, attributes: Vec<Attribute>, _location: Option<Location>) {
        self.seen_root = true;
        self.depth += 1;
        self.escape_text = !catalog::lookup(&name).is_special();
        self.print_start_tag(&name, &attributes);
    }

    fn empty_element(&mut self, name: String, attributes: Vec<Attribute>, _location: Option<Location>) {
        self.seen_root = true;
        self.print_start_tag(&name, &attributes);
    }

    fn end_element(&mut self, name: String, _location: Option<Location>) {
        self.depth = self.depth.saturating_sub(1);
        self.escape_text = true;
        self.print("</");
        self.print(&name);
        self.print_char('>');
    }

    fn characters(&mut self, text: String, _location: Option<Location>) {
        if self.print_chars {
            self.print_text(&text, self.escape_text);
        }
    }

    fn comment(&mut self, text: String, _location: Option<Location>) {
        if self.seen_root && self.depth == 0 {
            self.print_char('\n');
        }
        self.print("<!--");
        self.print(&text);
        self.print("-->");
        if !self.seen_root {
            self.print_char('\n');
        }
    }

    fn processing_instruction(&mut self, target: String, data: String, _location: Option<Location>) {
        self.print("<?");
        self.print(&target);
        if !data.is_empty() {
            self.print_char(' ');
            self.print(&data);
        }
        self.print_char('>');
    }

    fn start_entity(&mut self, name: String, _location: Option<Location>) {
        self.print_chars = false;
        let named = numeric_reference(&name)
            .and_then(entities::encode)
            .map_or(name, str::to_string);
        self.print_entity(&named);
    }

    fn end_entity(&mut self, _name: String, _location: Option<Location>) {
        self.print_chars = true;
    }
}

/// The character a `#65` or `#x41` entity name stands for.
fn numeric_reference(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let value = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_charset_is_rewritten() {
        assert_eq!(
            with_charset("text/html; charset=ISO-8859-1", "UTF-8"),
            "text/html; charset=UTF-8"
        );
        assert_eq!(with_charset("text/html", "UTF-8"), "text/html;charset=UTF-8");
    }

    #[test]
    fn test_numeric_reference() {
        assert_eq!(numeric_reference("#65"), Some('A'));
        assert_eq!(numeric_reference("#xE9"), Some('é'));
        assert_eq!(numeric_reference("amp"), None);
        assert_eq!(numeric_reference("#zz"), None);
    }

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let mut writer = HtmlWriter::new(String::new(), "UTF-8");
        writer.start_element(
            "a".to_string(),
            vec![Attribute::new("title", "say \"hi\"")],
            None,
        );
        writer.characters("1 < 2 & caf\u{e9}".to_string(), None);
        writer.end_element("a".to_string(), None);
        assert_eq!(
            writer.finish().unwrap(),
            "<a title=\"say &quot;hi&quot;\">1 &lt; 2 &amp; caf&eacute;</a>"
        );
    }

    #[test]
    fn test_raw_text_is_not_escaped() {
        let mut writer = HtmlWriter::new(String::new(), "UTF-8");
        writer.start_element("style".to_string(), Vec::new(), None);
        writer.characters("a > b".to_string(), None);
        writer.end_element("style".to_string(), None);
        assert_eq!(writer.finish().unwrap(), "<style>a > b</style>");
    }
}
