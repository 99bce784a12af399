//! Tag balancer.
//!
//! [`TagBalancer`] sits between the scanner and a downstream [`EventSink`] and
//! repairs the event stream so that every start tag has a matching end tag and
//! every element sits under a parent the catalog allows:
//!
//! - missing parents (HTML, HEAD, BODY, table sections) are inserted;
//! - start tags implicitly close the elements the catalog says they close;
//! - end tags close every element opened after their match, and inline
//!   formatting elements cut this way are reopened afterwards;
//! - stray end tags and duplicate HTML/HEAD/BODY/FORM start tags are dropped;
//! - text seen before any element is held until BODY exists.
//!
//! Repairs are reported as `HTML2xxx` diagnostics when `report_errors` is on.

mod listener;
mod lost_text;
mod stack;
mod stream;

use std::mem;
use std::rc::Rc;

use quokka_common::{ErrorReporter, WarnOnceReporter};

use crate::catalog::{self, ElementCode, ElementInfo};
use crate::config::BalancerConfig;
use crate::event::{Attribute, Location};
use crate::messages::MessageKey;
use crate::scanner::is_space;
use crate::sink::EventSink;

pub use listener::{BalanceListener, IgnoredTag, IgnoredTags, TagKind};
pub use stack::StackEntry;
pub use stream::BalancedEvents;

use lost_text::LostText;
use stack::ElementStack;

/// Component name used in diagnostics.
const COMPONENT: &str = "TagBalancer";

/// Document milestones seen so far.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default, Clone, Copy)]
struct Seen {
    anything: bool,
    doctype: bool,
    root: bool,
    root_end: bool,
    head: bool,
    body: bool,
}

/// An end tag held back until the end of the document.
#[derive(Debug)]
struct DeferredEnd {
    name: String,
    location: Option<Location>,
}

/// Event filter that produces a well-formed element tree.
pub struct TagBalancer<S> {
    config: BalancerConfig,
    reporter: Rc<dyn ErrorReporter>,
    listener: Option<Box<dyn BalanceListener>>,
    sink: S,

    stack: ElementStack,
    fragment_depth: usize,
    seen: Seen,
    opened_form: bool,
    ignore_outside_content: bool,
    lost_text: LostText,
    deferred_ends: Vec<DeferredEnd>,

    /// The next start tag is one the balancer inserted.
    forced_start: bool,
    /// The next end tag is a deferred one being replayed.
    forced_end: bool,
}

impl<S> std::fmt::Debug for TagBalancer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagBalancer")
            .field("config", &self.config)
            .field("stack", &self.stack)
            .field("seen", &self.seen)
            .finish_non_exhaustive()
    }
}

impl<S: EventSink> TagBalancer<S> {
    /// Create a balancer that forwards to `sink` and warns once per
    /// diagnostic key.
    pub fn new(config: BalancerConfig, sink: S) -> Self {
        Self::with_reporter(config, Rc::new(WarnOnceReporter), sink)
    }

    /// Create a balancer that sends diagnostics to `reporter`.
    pub fn with_reporter(config: BalancerConfig, reporter: Rc<dyn ErrorReporter>, sink: S) -> Self {
        let ignore_outside_content = config.ignore_outside_content;
        Self {
            config,
            reporter,
            listener: None,
            sink,
            stack: ElementStack::default(),
            fragment_depth: 0,
            seen: Seen::default(),
            opened_form: false,
            ignore_outside_content,
            lost_text: LostText::default(),
            deferred_ends: Vec::new(),
            forced_start: false,
            forced_end: false,
        }
    }

    /// Replace the diagnostic receiver.
    pub fn set_reporter(&mut self, reporter: Rc<dyn ErrorReporter>) {
        self.reporter = reporter;
    }

    /// Receive notifications about dropped tags.
    pub fn set_listener(&mut self, listener: Box<dyn BalanceListener>) {
        self.listener = Some(listener);
    }

    /// Settings in effect.
    #[must_use]
    pub const fn config(&self) -> &BalancerConfig {
        &self.config
    }

    /// Downstream sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Downstream sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the balancer, returning the downstream sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Elements currently open, outermost first.
    #[must_use]
    pub fn open_elements(&self) -> &[StackEntry] {
        self.stack.entries()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn report(&self, key: MessageKey, args: &[&str]) {
        log::trace!(target: "quokka::balancer", "{key} {args:?}");
        if self.config.report_errors {
            self.reporter.report(key.diagnostic(COMPONENT, args));
        }
    }

    fn synthesized(&self) -> Option<Location> {
        self.config.augmentations.then(Location::synthesized)
    }

    /// `name` in the configured element case.
    fn element_name(&self, name: &str) -> String {
        self.config.names_elems.apply(name)
    }

    fn notify_ignored_start(&mut self, name: &str, attributes: &[Attribute], location: Option<Location>) {
        log::debug!(target: "quokka::balancer", "dropping <{name}>");
        if let Some(listener) = self.listener.as_mut() {
            listener.ignored_start_element(name, attributes, location);
        }
    }

    fn notify_ignored_end(&mut self, name: &str, location: Option<Location>) {
        log::debug!(target: "quokka::balancer", "dropping </{name}>");
        if let Some(listener) = self.listener.as_mut() {
            listener.ignored_end_element(name, location);
        }
    }

    fn pop_and_close(&mut self, location: Option<Location>) {
        if let Some(entry) = self.stack.pop() {
            self.sink.end_element(entry.name, location);
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.fragment_depth = 0;
        self.seen = Seen::default();
        self.opened_form = false;
        self.ignore_outside_content = self.config.ignore_outside_content;
        self.lost_text.clear();
        self.deferred_ends.clear();
        self.forced_start = false;
        self.forced_end = false;
    }

    // =========================================================================
    // Forced elements
    // =========================================================================

    /// Insert a start tag the input lacked. Returns whether it is now the
    /// innermost open element.
    fn force_start_element(&mut self, name: String, attributes: Vec<Attribute>) -> bool {
        self.forced_start = true;
        let location = self.synthesized();
        self.handle_start_element(name.clone(), attributes, location);
        self.stack.top().is_some_and(|entry| entry.name == name)
    }

    fn force_start_body(&mut self) {
        let body = self.element_name("body");
        self.report(MessageKey::BodyForced, &[&body]);
        let _ = self.force_start_element(body, Vec::new());
    }

    /// Insert `parent` ahead of `name`. On failure the start tag is dropped,
    /// and the listener hears about it unless the tag was itself inserted.
    fn force_parent(
        &mut self,
        key: MessageKey,
        name: &str,
        parent: &ElementInfo,
        attributes: &[Attribute],
        location: Option<Location>,
        forced: bool,
    ) -> bool {
        let parent = self.element_name(&parent.name.to_ascii_lowercase());
        self.report(key, &[name, &parent]);
        if self.force_start_element(parent, Vec::new()) {
            return true;
        }
        if !forced {
            self.notify_ignored_start(name, attributes, location);
        }
        false
    }

    // =========================================================================
    // Held-back input
    // =========================================================================

    fn consume_deferred_ends(&mut self) {
        for deferred in mem::take(&mut self.deferred_ends) {
            self.forced_end = true;
            self.handle_end_element(deferred.name, deferred.location);
        }
    }

    fn refeed_lost_text(&mut self) {
        for (text, location) in self.lost_text.take() {
            self.handle_characters(text, location);
        }
    }

    /// Place held-back text into BODY before anything else is forwarded.
    fn consume_early_text(&mut self) {
        if self.lost_text.is_empty() {
            return;
        }
        if !self.seen.body {
            self.force_start_body();
        }
        self.refeed_lost_text();
    }

    // =========================================================================
    // Start tags
    // =========================================================================

    fn handle_start_element(&mut self, name: String, attributes: Vec<Attribute>, location: Option<Location>) {
        self.seen.anything = true;
        let forced = mem::take(&mut self.forced_start);
        if self.seen.root_end {
            self.notify_ignored_start(&name, &attributes, location);
            return;
        }

        let element = catalog::lookup(&name);
        let code = element.code;

        if forced && matches!(code, ElementCode::Table | ElementCode::Select) {
            return;
        }
        if self.seen.root && code == ElementCode::Html {
            self.notify_ignored_start(&name, &attributes, location);
            return;
        }
        match code {
            ElementCode::Head => {
                if self.seen.head {
                    self.notify_ignored_start(&name, &attributes, location);
                    return;
                }
                self.seen.head = true;
            }
            ElementCode::Frameset | ElementCode::Unknown => self.consume_deferred_ends(),
            ElementCode::Body => {
                if !self.seen.head {
                    let head = self.element_name("head");
                    let _ = self.force_start_element(head.clone(), Vec::new());
                    let synthesized = self.synthesized();
                    self.handle_end_element(head, synthesized);
                }
                self.consume_deferred_ends();
                if self.seen.body {
                    self.notify_ignored_start(&name, &attributes, location);
                    return;
                }
                self.seen.body = true;
            }
            ElementCode::Form => {
                if self.opened_form {
                    self.notify_ignored_start(&name, &attributes, location);
                    return;
                }
                self.opened_form = true;
            }
            _ => {}
        }

        // Make sure the element has a parent it may live in.
        if let Some(preferred) = element.preferred_parent() {
            let fragment = self.config.document_fragment;
            if fragment && matches!(preferred.code, ElementCode::Head | ElementCode::Body) {
                // The fragment context stands in for HEAD and BODY.
            } else if !self.seen.root && !fragment {
                if !self.force_parent(
                    MessageKey::ParentForcedBeforeRoot,
                    &name,
                    preferred,
                    &attributes,
                    location,
                    forced,
                ) {
                    return;
                }
            } else if (preferred.code != ElementCode::Head || (!self.seen.body && !fragment))
                && self.stack.parent_depth(element.parents, element.bounds).is_none()
                && !self.force_parent(MessageKey::ParentForced, &name, preferred, &attributes, location, forced)
            {
                return;
            }
        }

        // Elements with no flags close the inline elements around them and
        // reopen them inside.
        let mut rescued = Vec::new();
        if element.flags.is_none() {
            let synthesized = self.synthesized();
            for i in (0..self.stack.len()).rev() {
                let Some(entry) = self.stack.get(i).cloned() else {
                    break;
                };
                if !entry.element.is_inline() {
                    break;
                }
                self.handle_end_element(entry.name.clone(), synthesized);
                rescued.push(entry);
            }
        }

        // Nothing nests inside SCRIPT, and HEAD children do not nest.
        let len = self.stack.len();
        if (len > 1 && self.stack.top_code() == Some(ElementCode::Script))
            || (len > 2 && self.stack.code_at(len - 2) == Some(ElementCode::Head))
        {
            let synthesized = self.synthesized();
            self.pop_and_close(synthesized);
        }

        if !element.closes.is_empty() {
            let synthesized = self.synthesized();
            let mut length = self.stack.len();
            let mut i = length;
            while i > 0 {
                i -= 1;
                let Some(entry) = self.stack.get(i) else {
                    break;
                };
                let open = entry.element;
                if element.closes(open.code) {
                    let open_name = entry.name.clone();
                    self.report(MessageKey::ImplicitClose, &[&name, &open_name]);
                    for _ in i..length {
                        self.pop_and_close(synthesized);
                    }
                    length = i;
                    continue;
                }
                if open.is_block() || element.is_parent(open) {
                    break;
                }
            }
        } else if code == ElementCode::Table {
            let synthesized = self.synthesized();
            for i in (0..self.stack.len()).rev() {
                let Some(entry) = self.stack.get(i) else {
                    break;
                };
                if !entry.element.is_inline() {
                    break;
                }
                let open_name = entry.name.clone();
                self.handle_end_element(open_name, synthesized);
            }
        }

        self.seen.root = true;
        if element.is_empty() {
            self.sink.empty_element(name, attributes, location);
        } else {
            let kept = if element.is_inline() {
                attributes.clone()
            } else {
                Vec::new()
            };
            self.stack.push(StackEntry {
                element,
                name: name.clone(),
                attributes: kept,
            });
            self.sink.start_element(name, attributes, location);
        }

        for entry in rescued.into_iter().rev() {
            let _ = self.force_start_element(entry.name, entry.attributes);
        }

        if code == ElementCode::Body {
            self.refeed_lost_text();
        }
    }

    // =========================================================================
    // End tags
    // =========================================================================

    fn handle_end_element(&mut self, name: String, location: Option<Location>) {
        let forced = mem::take(&mut self.forced_end);
        if self.seen.root_end {
            self.notify_ignored_end(&name, location);
            return;
        }

        let element = catalog::lookup(&name);
        if !self.ignore_outside_content && matches!(element.code, ElementCode::Body | ElementCode::Html) {
            self.deferred_ends.push(DeferredEnd { name, location });
            return;
        }
        match element.code {
            ElementCode::Html => self.seen.root_end = true,
            ElementCode::Form => self.opened_form = false,
            ElementCode::Head if !forced => {
                self.deferred_ends.push(DeferredEnd { name, location });
                return;
            }
            _ => {}
        }

        let Some(depth) = self.stack.element_depth(element, &name, self.fragment_depth) else {
            if element.code == ElementCode::P {
                if self.force_start_element(name.clone(), Vec::new()) {
                    self.handle_end_element(name, location);
                }
            } else if !element.is_empty() {
                self.notify_ignored_end(&name, location);
            }
            return;
        };

        // Inline elements cut by this end tag are reopened after it.
        let mut reopen = Vec::new();
        if depth > 1 && element.is_inline() {
            let top = self.stack.len();
            for i in 0..depth - 1 {
                let Some(entry) = self.stack.get(top - i - 1) else {
                    break;
                };
                if entry.element.is_inline() || entry.element.code == ElementCode::Font {
                    reopen.push(entry.clone());
                }
            }
        }

        let synthesized = self.synthesized();
        for i in 0..depth {
            let Some(entry) = self.stack.pop() else {
                break;
            };
            if i + 1 < depth {
                let closing = self.element_name(&name);
                self.report(MessageKey::IntermediateClosed, &[&closing, &entry.name]);
                self.sink.end_element(entry.name, synthesized);
            } else {
                self.sink.end_element(entry.name, location);
            }
        }

        for entry in reopen.into_iter().rev() {
            self.report(MessageKey::InlineReopened, &[&entry.name]);
            let _ = self.force_start_element(entry.name, entry.attributes);
        }
    }

    // =========================================================================
    // Text
    // =========================================================================

    fn handle_characters(&mut self, text: String, location: Option<Location>) {
        if self.seen.root_end {
            return;
        }
        let fragment = self.config.document_fragment;
        if self.stack.is_empty() && !fragment {
            self.lost_text.add(text, location);
            return;
        }

        let whitespace = text.chars().all(is_space);
        if !fragment {
            if !self.seen.root {
                if whitespace {
                    return;
                }
                self.force_start_body();
            }
            if whitespace {
                if self.stack.len() < 2 || self.deferred_ends.len() == 1 {
                    return;
                }
            } else if matches!(self.stack.top_code(), Some(ElementCode::Head | ElementCode::Html)) {
                let head = self.element_name("head");
                let body = self.element_name("body");
                self.report(MessageKey::ContentMovedToBody, &[&head, &body]);
                self.force_start_body();
            }
        }
        self.sink.characters(text, location);
    }
}

impl<S: EventSink> EventSink for TagBalancer<S> {
    fn start_document(&mut self, location: Option<Location>) {
        self.reset();
        if self.config.document_fragment {
            let context = self.config.fragment_context.clone();
            for name in context {
                self.stack.push(StackEntry {
                    element: catalog::lookup(&name),
                    name,
                    attributes: Vec::new(),
                });
            }
            self.fragment_depth = self.stack.len();
        }
        self.sink.start_document(location);
    }

    fn xml_decl(
        &mut self,
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<String>,
        location: Option<Location>,
    ) {
        if !self.seen.anything {
            self.sink.xml_decl(version, encoding, standalone, location);
        }
    }

    fn doctype(
        &mut self,
        root: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        location: Option<Location>,
    ) {
        self.seen.anything = true;
        if self.seen.root {
            self.report(MessageKey::DoctypeAfterRoot, &[]);
        } else if self.seen.doctype {
            self.report(MessageKey::DuplicateDoctype, &[]);
        }
        if !self.seen.root && !self.seen.doctype {
            self.seen.doctype = true;
            self.sink.doctype(root, public_id, system_id, location);
        }
    }

    fn start_element(&mut self, name: String, attributes: Vec<Attribute>, location: Option<Location>) {
        self.handle_start_element(name, attributes, location);
    }

    fn empty_element(&mut self, name: String, attributes: Vec<Attribute>, location: Option<Location>) {
        self.handle_start_element(name.clone(), attributes, location);
        let element = catalog::lookup(&name);
        if element.is_empty() || element.code == ElementCode::Unknown {
            self.handle_end_element(name, location);
        }
    }

    fn end_element(&mut self, name: String, location: Option<Location>) {
        self.handle_end_element(name, location);
    }

    fn characters(&mut self, text: String, location: Option<Location>) {
        self.handle_characters(text, location);
    }

    fn comment(&mut self, text: String, location: Option<Location>) {
        self.seen.anything = true;
        self.consume_early_text();
        self.sink.comment(text, location);
    }

    fn start_cdata(&mut self, location: Option<Location>) {
        self.seen.anything = true;
        self.consume_early_text();
        if self.seen.root_end {
            return;
        }
        self.sink.start_cdata(location);
    }

    fn end_cdata(&mut self, location: Option<Location>) {
        if self.seen.root_end {
            return;
        }
        self.sink.end_cdata(location);
    }

    fn processing_instruction(&mut self, target: String, data: String, location: Option<Location>) {
        self.seen.anything = true;
        self.consume_early_text();
        self.sink.processing_instruction(target, data, location);
    }

    fn start_entity(&mut self, name: String, location: Option<Location>) {
        self.seen.anything = true;
        if self.seen.root_end {
            return;
        }
        if !self.config.document_fragment {
            let mut insert_body = !self.seen.root;
            if !insert_body && matches!(self.stack.top_code(), Some(ElementCode::Head | ElementCode::Html)) {
                let head = self.element_name("head");
                let body = self.element_name("body");
                self.report(MessageKey::ContentMovedToBody, &[&head, &body]);
                let synthesized = self.synthesized();
                self.handle_end_element(head, synthesized);
                insert_body = true;
            }
            if insert_body {
                self.force_start_body();
            }
        }
        self.sink.start_entity(name, location);
    }

    fn end_entity(&mut self, name: String, location: Option<Location>) {
        if self.seen.root_end {
            return;
        }
        self.sink.end_entity(name, location);
    }

    fn end_document(&mut self, location: Option<Location>) {
        self.ignore_outside_content = true;
        self.consume_deferred_ends();

        let synthesized = self.synthesized();
        if !self.seen.root && !self.config.document_fragment {
            self.report(MessageKey::EmptyDocument, &[]);
            self.seen.root_end = false;
            self.force_start_body();
            let body = self.element_name("body");
            let html = self.element_name("html");
            self.handle_end_element(body, synthesized);
            self.handle_end_element(html, synthesized);
        } else {
            while self.stack.len() > self.fragment_depth {
                if let Some(name) = self.stack.top().map(|entry| entry.name.clone()) {
                    self.report(MessageKey::UnclosedElement, &[&name]);
                }
                self.pop_and_close(synthesized);
            }
        }
        self.sink.end_document(location);
    }
}
