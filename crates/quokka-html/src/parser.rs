//! Scanner and balancer wired together.
//!
//! [`HtmlParser`] is the usual entry point: it scans a source, balances the
//! events unless `balance_tags` is off, and drives them into any
//! [`EventSink`].
//!
//! ```
//! use quokka_html::{HtmlParser, HtmlWriter};
//!
//! let mut writer = HtmlWriter::new(String::new(), "UTF-8");
//! HtmlParser::default().parse_str("Hello<p>World", &mut writer).unwrap();
//! assert_eq!(
//!     writer.finish().unwrap(),
//!     "<html><head></head><body>Hello<p>World</p></body></html>"
//! );
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use quokka_common::{ErrorReporter, WarnOnceReporter};

use crate::balancer::{BalanceListener, BalancedEvents, TagBalancer};
use crate::config::ParserConfig;
use crate::error::Result;
use crate::event::ScanEvent;
use crate::scanner::{HtmlScanner, InputSource};
use crate::sink::EventSink;

/// Reusable scan-and-balance pipeline.
#[derive(Clone)]
pub struct HtmlParser {
    config: ParserConfig,
    reporter: Rc<dyn ErrorReporter>,
    listener: Option<Rc<RefCell<dyn BalanceListener>>>,
}

impl std::fmt::Debug for HtmlParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlParser")
            .field("config", &self.config)
            .field("listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl HtmlParser {
    /// Create a parser with `config`. Diagnostics go through the shared
    /// warning facility until another reporter is set.
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            reporter: Rc::new(WarnOnceReporter),
            listener: None,
        }
    }

    /// Send diagnostics from both stages to `reporter`.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Rc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Tell `listener` about tags the balancer drops.
    #[must_use]
    pub fn with_listener(mut self, listener: Rc<RefCell<dyn BalanceListener>>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Settings in effect.
    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Settings in effect, mutably.
    pub fn config_mut(&mut self) -> &mut ParserConfig {
        &mut self.config
    }

    fn scanner(&self, source: InputSource) -> Result<HtmlScanner> {
        let mut scanner = HtmlScanner::with_reporter(self.config.scanner.clone(), Rc::clone(&self.reporter));
        scanner.set_input_source(source)?;
        Ok(scanner)
    }

    /// Parse `source` into `sink`.
    ///
    /// # Errors
    ///
    /// Fails when the source cannot be read or names an encoding that is not
    /// supported. Malformed markup never fails.
    pub fn parse<S: EventSink + ?Sized>(&self, source: InputSource, sink: &mut S) -> Result<()> {
        let mut scanner = self.scanner(source)?;
        if !self.config.balance_tags {
            return scanner.scan_document(sink);
        }
        let mut balancer = TagBalancer::with_reporter(self.config.balancer.clone(), Rc::clone(&self.reporter), sink);
        if let Some(listener) = &self.listener {
            balancer.set_listener(Box::new(Rc::clone(listener)));
        }
        scanner.scan_document(&mut balancer)
    }

    /// Parse already decoded text.
    ///
    /// # Errors
    ///
    /// See [`HtmlParser::parse`].
    pub fn parse_str<S: EventSink + ?Sized>(&self, html: &str, sink: &mut S) -> Result<()> {
        self.parse(InputSource::from_text(html), sink)
    }

    /// Parse raw bytes, detecting their encoding.
    ///
    /// # Errors
    ///
    /// See [`HtmlParser::parse`].
    pub fn parse_bytes<S: EventSink + ?Sized>(&self, bytes: &[u8], sink: &mut S) -> Result<()> {
        self.parse(InputSource::from_bytes(bytes), sink)
    }

    /// Parse a fragment that will live inside `context` (outermost first).
    ///
    /// No HTML, HEAD or BODY is inserted, and nothing in `context` is closed.
    ///
    /// # Errors
    ///
    /// See [`HtmlParser::parse`].
    pub fn parse_fragment<S: EventSink + ?Sized>(
        &self,
        source: InputSource,
        context: &[&str],
        sink: &mut S,
    ) -> Result<()> {
        let mut fragment = self.clone();
        fragment.config.balance_tags = true;
        fragment.config.balancer.document_fragment = true;
        fragment.config.balancer.fragment_context = context.iter().map(ToString::to_string).collect();
        fragment.parse(source, sink)
    }

    /// Events of `source` as an iterator, balanced unless `balance_tags` is
    /// off.
    ///
    /// # Errors
    ///
    /// Fails when the source's declared encoding is not supported. Read
    /// errors surface as items.
    pub fn events(&self, source: InputSource) -> Result<Box<dyn Iterator<Item = Result<ScanEvent>>>> {
        let scanner = self.scanner(source)?;
        if !self.config.balance_tags {
            return Ok(Box::new(scanner));
        }
        let mut events = BalancedEvents::new(scanner, self.config.balancer.clone(), Rc::clone(&self.reporter));
        if let Some(listener) = &self.listener {
            events.set_listener(Box::new(Rc::clone(listener)));
        }
        Ok(Box::new(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::EventCollector;

    #[test]
    fn test_unbalanced_pipeline_keeps_scanner_output() {
        let config = ParserConfig {
            balance_tags: false,
            ..ParserConfig::default()
        };
        let mut collector = EventCollector::new();
        HtmlParser::new(config).parse_str("<b>x", &mut collector).unwrap();
        let names: Vec<_> = collector.events().iter().filter_map(|event| event.element_name()).collect();
        assert_eq!(names, ["b"]);
    }

    #[test]
    fn test_events_match_sink_output() {
        let parser = HtmlParser::default();
        let mut collector = EventCollector::new();
        parser.parse_str("<ul><li>one<li>two</ul>", &mut collector).unwrap();
        let pulled: Vec<_> = parser
            .events(InputSource::from_text("<ul><li>one<li>two</ul>"))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(pulled, collector.into_events());
    }
}
