//! Event consumers.
//!
//! The scanner, the balancer and the filters all talk to the next stage
//! through [`EventSink`]. Every method has a no-op default so a consumer only
//! implements what it cares about.

use crate::event::{Attribute, Location, ScanEvent};

/// Receiver of markup events, one method per event kind.
#[allow(unused_variables)]
pub trait EventSink {
    /// Beginning of the document.
    fn start_document(&mut self, location: Option<Location>) {}

    /// XML declaration.
    fn xml_decl(
        &mut self,
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<String>,
        location: Option<Location>,
    ) {
    }

    /// Document type declaration.
    fn doctype(
        &mut self,
        root: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        location: Option<Location>,
    ) {
    }

    /// Start tag.
    fn start_element(&mut self, name: String, attributes: Vec<Attribute>, location: Option<Location>) {}

    /// Start tag that closes itself.
    fn empty_element(&mut self, name: String, attributes: Vec<Attribute>, location: Option<Location>) {}

    /// End tag.
    fn end_element(&mut self, name: String, location: Option<Location>) {}

    /// Character data.
    fn characters(&mut self, text: String, location: Option<Location>) {}

    /// Comment.
    fn comment(&mut self, text: String, location: Option<Location>) {}

    /// Start of a CDATA section.
    fn start_cdata(&mut self, location: Option<Location>) {}

    /// End of a CDATA section.
    fn end_cdata(&mut self, location: Option<Location>) {}

    /// Processing instruction.
    fn processing_instruction(&mut self, target: String, data: String, location: Option<Location>) {}

    /// Start of an expanded entity reference.
    fn start_entity(&mut self, name: String, location: Option<Location>) {}

    /// End of an expanded entity reference.
    fn end_entity(&mut self, name: String, location: Option<Location>) {}

    /// End of the document.
    fn end_document(&mut self, location: Option<Location>) {}
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn start_document(&mut self, location: Option<Location>) {
        (**self).start_document(location);
    }

    fn xml_decl(
        &mut self,
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<String>,
        location: Option<Location>,
    ) {
        (**self).xml_decl(version, encoding, standalone, location);
    }

    fn doctype(
        &mut self,
        root: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        location: Option<Location>,
    ) {
        (**self).doctype(root, public_id, system_id, location);
    }

    fn start_element(&mut self, name: String, attributes: Vec<Attribute>, location: Option<Location>) {
        (**self).start_element(name, attributes, location);
    }

    fn empty_element(&mut self, name: String, attributes: Vec<Attribute>, location: Option<Location>) {
        (**self).empty_element(name, attributes, location);
    }

    fn end_element(&mut self, name: String, location: Option<Location>) {
        (**self).end_element(name, location);
    }

    fn characters(&mut self, text: String, location: Option<Location>) {
        (**self).characters(text, location);
    }

    fn comment(&mut self, text: String, location: Option<Location>) {
        (**self).comment(text, location);
    }

    fn start_cdata(&mut self, location: Option<Location>) {
        (**self).start_cdata(location);
    }

    fn end_cdata(&mut self, location: Option<Location>) {
        (**self).end_cdata(location);
    }

    fn processing_instruction(&mut self, target: String, data: String, location: Option<Location>) {
        (**self).processing_instruction(target, data, location);
    }

    fn start_entity(&mut self, name: String, location: Option<Location>) {
        (**self).start_entity(name, location);
    }

    fn end_entity(&mut self, name: String, location: Option<Location>) {
        (**self).end_entity(name, location);
    }

    fn end_document(&mut self, location: Option<Location>) {
        (**self).end_document(location);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn start_document(&mut self, location: Option<Location>) {
        (**self).start_document(location);
    }

    fn xml_decl(
        &mut self,
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<String>,
        location: Option<Location>,
    ) {
        (**self).xml_decl(version, encoding, standalone, location);
    }

    fn doctype(
        &mut self,
        root: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        location: Option<Location>,
    ) {
        (**self).doctype(root, public_id, system_id, location);
    }

    fn start_element(&mut self, name: String, attributes: Vec<Attribute>, location: Option<Location>) {
        (**self).start_element(name, attributes, location);
    }

    fn empty_element(&mut self, name: String, attributes: Vec<Attribute>, location: Option<Location>) {
        (**self).empty_element(name, attributes, location);
    }

    fn end_element(&mut self, name: String, location: Option<Location>) {
        (**self).end_element(name, location);
    }

    fn characters(&mut self, text: String, location: Option<Location>) {
        (**self).characters(text, location);
    }

    fn comment(&mut self, text: String, location: Option<Location>) {
        (**self).comment(text, location);
    }

    fn start_cdata(&mut self, location: Option<Location>) {
        (**self).start_cdata(location);
    }

    fn end_cdata(&mut self, location: Option<Location>) {
        (**self).end_cdata(location);
    }

    fn processing_instruction(&mut self, target: String, data: String, location: Option<Location>) {
        (**self).processing_instruction(target, data, location);
    }

    fn start_entity(&mut self, name: String, location: Option<Location>) {
        (**self).start_entity(name, location);
    }

    fn end_entity(&mut self, name: String, location: Option<Location>) {
        (**self).end_entity(name, location);
    }

    fn end_document(&mut self, location: Option<Location>) {
        (**self).end_document(location);
    }
}

/// Route one event to the matching sink method.
pub fn dispatch<S: EventSink + ?Sized>(sink: &mut S, event: ScanEvent) {
    match event {
        ScanEvent::StartDocument { location } => sink.start_document(location),
        ScanEvent::XmlDecl {
            version,
            encoding,
            standalone,
            location,
        } => sink.xml_decl(version, encoding, standalone, location),
        ScanEvent::Doctype {
            root,
            public_id,
            system_id,
            location,
        } => sink.doctype(root, public_id, system_id, location),
        ScanEvent::StartElement {
            name,
            attributes,
            location,
        } => sink.start_element(name, attributes, location),
        ScanEvent::EmptyElement {
            name,
            attributes,
            location,
        } => sink.empty_element(name, attributes, location),
        ScanEvent::EndElement { name, location } => sink.end_element(name, location),
        ScanEvent::Characters { text, location } => sink.characters(text, location),
        ScanEvent::Comment { text, location } => sink.comment(text, location),
        ScanEvent::StartCData { location } => sink.start_cdata(location),
        ScanEvent::EndCData { location } => sink.end_cdata(location),
        ScanEvent::ProcessingInstruction {
            target,
            data,
            location,
        } => sink.processing_instruction(target, data, location),
        ScanEvent::StartEntity { name, location } => sink.start_entity(name, location),
        ScanEvent::EndEntity { name, location } => sink.end_entity(name, location),
        ScanEvent::EndDocument { location } => sink.end_document(location),
    }
}

/// Sink that records every event it receives.
#[derive(Debug, Default, Clone)]
pub struct EventCollector {
    events: Vec<ScanEvent>,
}

impl EventCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    #[must_use]
    pub fn events(&self) -> &[ScanEvent] {
        &self.events
    }

    /// Consume the collector, returning its events.
    #[must_use]
    pub fn into_events(self) -> Vec<ScanEvent> {
        self.events
    }

    /// Remove and return the events received so far.
    pub fn take(&mut self) -> Vec<ScanEvent> {
        std::mem::take(&mut self.events)
    }

    /// Concatenated text of every `Characters` event.
    #[must_use]
    pub fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|event| match event {
                ScanEvent::Characters { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for EventCollector {
    fn start_document(&mut self, location: Option<Location>) {
        self.events.push(ScanEvent::StartDocument { location });
    }

    fn xml_decl(
        &mut self,
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<String>,
        location: Option<Location>,
    ) {
        self.events.push(ScanEvent::XmlDecl {
            version,
            encoding,
            standalone,
            location,
        });
    }

    fn doctype(
        &mut self,
        root: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        location: Option<Location>,
    ) {
        self.events.push(ScanEvent::Doctype {
            root,
            public_id,
            system_id,
            location,
        });
    }

    fn start_element(&mut self, name: String, attributes: Vec<Attribute>, location: Option<Location>) {
        self.events.push(ScanEvent::StartElement {
            name,
            attributes,
            location,
        });
    }

    fn empty_element(&mut self, name: String, attributes: Vec<Attribute>, location: Option<Location>) {
        self.events.push(ScanEvent::EmptyElement {
            name,
            attributes,
            location,
        });
    }

    fn end_element(&mut self, name: String, location: Option<Location>) {
        self.events.push(ScanEvent::EndElement { name, location });
    }

    fn characters(&mut self, text: String, location: Option<Location>) {
        self.events.push(ScanEvent::Characters { text, location });
    }

    fn comment(&mut self, text: String, location: Option<Location>) {
        self.events.push(ScanEvent::Comment { text, location });
    }

    fn start_cdata(&mut self, location: Option<Location>) {
        self.events.push(ScanEvent::StartCData { location });
    }

    fn end_cdata(&mut self, location: Option<Location>) {
        self.events.push(ScanEvent::EndCData { location });
    }

    fn processing_instruction(&mut self, target: String, data: String, location: Option<Location>) {
        self.events.push(ScanEvent::ProcessingInstruction {
            target,
            data,
            location,
        });
    }

    fn start_entity(&mut self, name: String, location: Option<Location>) {
        self.events.push(ScanEvent::StartEntity { name, location });
    }

    fn end_entity(&mut self, name: String, location: Option<Location>) {
        self.events.push(ScanEvent::EndEntity { name, location });
    }

    fn end_document(&mut self, location: Option<Location>) {
        self.events.push(ScanEvent::EndDocument { location });
    }
}
