//! Tolerant HTML scanning and tag balancing for the Quokka toolkit.
//!
//! # Scope
//!
//! This crate implements:
//! - **Scanner** ([`scanner`])
//!   - Byte order mark, `<meta>` and `<?xml?>` encoding detection with a
//!     single replay of the document head
//!   - Character and entity references, including Windows-1252 fix-ups
//!   - Raw-text elements (SCRIPT, STYLE, TEXTAREA, TITLE, ...)
//!   - Lenient comments, CDATA sections, doctypes and processing instructions
//!
//! - **Tag Balancer** ([`balancer`])
//!   - Implied HTML, HEAD and BODY, natural parents and implicit closes
//!   - Inline formatting elements reopened across block boundaries
//!   - Document fragments parsed inside a context stack
//!
//! - **Consumers**: [`HtmlWriter`] prints events as HTML, [`ElementRemover`]
//!   filters elements, [`EventCollector`] records them.
//!
//! # Not Implemented
//!
//! - HTML5 tree construction (adoption agency, foster parenting)
//! - Encoding detection beyond BOM, `<meta>` and the XML declaration

/// Tag balancer.
pub mod balancer;
/// Static element metadata.
pub mod catalog;
/// Scanner, balancer and parser settings.
pub mod config;
/// Named character references.
pub mod entities;
/// Fatal errors.
pub mod error;
/// Markup events.
pub mod event;
/// Element filtering.
pub mod filter;
/// Diagnostic message keys.
pub mod messages;
/// Scanner and balancer wired together.
pub mod parser;
/// Streaming HTML scanner.
pub mod scanner;
/// Event consumers.
pub mod sink;
/// HTML serializer.
pub mod writer;

pub use balancer::{BalanceListener, BalancedEvents, IgnoredTags, TagBalancer};
pub use catalog::{ElementCode, ElementInfo};
pub use config::{BalancerConfig, NameCase, ParserConfig, ScannerConfig};
pub use error::{Error, Result};
pub use event::{Attribute, Location, Position, ScanEvent};
pub use filter::ElementRemover;
pub use messages::MessageKey;
pub use parser::HtmlParser;
pub use scanner::{HtmlScanner, InputSource};
pub use sink::{EventCollector, EventSink, dispatch};
pub use writer::HtmlWriter;
