//! Element filtering.
//!
//! [`ElementRemover`] sorts every element into one of three groups:
//!
//! - accepted elements pass through, keeping only allowed attributes;
//! - removed elements are dropped together with everything inside them;
//! - all other elements are unwrapped: the tags go, the content stays.
//!
//! ```
//! use quokka_html::filter::ElementRemover;
//! use quokka_html::{EventCollector, HtmlParser};
//!
//! let mut remover = ElementRemover::new(EventCollector::new());
//! remover.accept_element("b", &[]);
//! remover.remove_element("script");
//! HtmlParser::default()
//!     .parse_str("<p>a<b>b</b><script>c</script></p>", &mut remover)
//!     .unwrap();
//! assert_eq!(remover.into_inner().text(), "ab");
//! ```

use std::collections::{HashMap, HashSet};

use crate::event::{Attribute, Location};
use crate::sink::EventSink;

/// Filter that keeps, drops or unwraps elements by name.
#[derive(Debug)]
pub struct ElementRemover<S> {
    sink: S,
    /// Accepted element names, mapped to their allowed attribute names.
    accepted: HashMap<String, Vec<String>>,
    removed: HashSet<String>,
    depth: usize,
    /// Depth of the removed element being skipped.
    removal_depth: Option<usize>,
}

impl<S: EventSink> ElementRemover<S> {
    /// Create a filter that forwards to `sink`. Nothing is accepted yet, so
    /// every element is unwrapped.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            accepted: HashMap::new(),
            removed: HashSet::new(),
            depth: 0,
            removal_depth: None,
        }
    }

    /// Keep `element` and the listed attributes. Names are case-insensitive.
    pub fn accept_element(&mut self, element: &str, attributes: &[&str]) {
        let attributes = attributes.iter().map(|name| name.to_lowercase()).collect();
        let _ = self.accepted.insert(element.to_lowercase(), attributes);
    }

    /// Drop `element` and its content.
    pub fn remove_element(&mut self, element: &str) {
        let _ = self.removed.insert(element.to_lowercase());
    }

    /// Downstream sink.
    pub const fn get_ref(&self) -> &S {
        &self.sink
    }

    /// Consume the filter, returning the downstream sink.
    pub fn into_inner(self) -> S {
        self.sink
    }

    fn passing(&self) -> bool {
        self.removal_depth.is_none_or(|removal| self.depth <= removal)
    }

    fn is_accepted(&self, name: &str) -> bool {
        self.accepted.contains_key(&name.to_lowercase())
    }

    /// Whether a start tag is forwarded. Strips attributes that are not
    /// allowed, and starts skipping when the element is removed.
    fn open_tag(&mut self, name: &str, attributes: &mut Vec<Attribute>, empty: bool) -> bool {
        let key = name.to_lowercase();
        if let Some(allowed) = self.accepted.get(&key) {
            attributes.retain(|attribute| allowed.contains(&attribute.name.to_lowercase()));
            return true;
        }
        if !empty && self.removed.contains(&key) {
            self.removal_depth = Some(self.depth);
        }
        false
    }
}

impl<S: EventSink> EventSink for ElementRemover<S> {
    fn start_document(&mut self, location: Option<Location>) {
        self.depth = 0;
        self.removal_depth = None;
        self.sink.start_document(location);
    }

    fn xml_decl(
        &mut self,
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<String>,
        location: Option<Location>,
    ) {
        self.sink.xml_decl(version, encoding, standalone, location);
    }

    fn doctype(
        &mut self,
        root: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        location: Option<Location>,
    ) {
        self.sink.doctype(root, public_id, system_id, location);
    }

    fn start_element(&mut self, name: String, mut attributes: Vec<Attribute>, location: Option<Location>) {
        if self.passing() && self.open_tag(&name, &mut attributes, false) {
            self.sink.start_element(name, attributes, location);
        }
        self.depth += 1;
    }

    fn empty_element(&mut self, name: String, mut attributes: Vec<Attribute>, location: Option<Location>) {
        if self.passing() && self.open_tag(&name, &mut attributes, true) {
            self.sink.empty_element(name, attributes, location);
        }
    }

    fn end_element(&mut self, name: String, location: Option<Location>) {
        if self.passing() && self.is_accepted(&name) {
            self.sink.end_element(name, location);
        }
        self.depth = self.depth.saturating_sub(1);
        if self.removal_depth == Some(self.depth) {
            self.removal_depth = None;
        }
    }

    fn characters(&mut self, text: String, location: Option<Location>) {
        if self.passing() {
            self.sink.characters(text, location);
        }
    }

    fn comment(&mut self, text: String, location: Option<Location>) {
        if self.passing() {
            self.sink.comment(text, location);
        }
    }

    fn start_cdata(&mut self, location: Option<Location>) {
        if self.passing() {
            self.sink.start_cdata(location);
        }
    }

    fn end_cdata(&mut self, location: Option<Location>) {
        if self.passing() {
            self.sink.end_cdata(location);
        }
    }

    fn processing_instruction(&mut self, target: String, data: String, location: Option<Location>) {
        if self.passing() {
            self.sink.processing_instruction(target, data, location);
        }
    }

    fn start_entity(&mut self, name: String, location: Option<Location>) {
        if self.passing() {
            self.sink.start_entity(name, location);
        }
    }

    fn end_entity(&mut self, name: String, location: Option<Location>) {
        if self.passing() {
            self.sink.end_entity(name, location);
        }
    }

    fn end_document(&mut self, location: Option<Location>) {
        self.sink.end_document(location);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::EventCollector;

    #[test]
    fn test_removed_element_takes_its_content() {
        let mut remover = ElementRemover::new(EventCollector::new());
        remover.accept_element("p", &[]);
        remover.remove_element("script");
        remover.start_element("p".to_string(), Vec::new(), None);
        remover.start_element("script".to_string(), Vec::new(), None);
        remover.characters("x".to_string(), None);
        remover.end_element("script".to_string(), None);
        remover.characters("y".to_string(), None);
        remover.end_element("p".to_string(), None);
        let collector = remover.into_inner();
        assert_eq!(collector.text(), "y");
        assert_eq!(collector.events().len(), 3);
    }

    #[test]
    fn test_attribute_allow_list() {
        let mut remover = ElementRemover::new(EventCollector::new());
        remover.accept_element("A", &["HREF"]);
        remover.start_element(
            "a".to_string(),
            vec![Attribute::new("href", "/"), Attribute::new("onclick", "x()")],
            None,
        );
        let events = remover.into_inner().into_events();
        let crate::event::ScanEvent::StartElement { attributes, .. } = &events[0] else {
            panic!("expected a start tag, got {:?}", events[0]);
        };
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].name, "href");
    }
}
