//! Notifications about tags the balancer throws away.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::event::{Attribute, Location};

/// Told about every start or end tag the balancer drops.
///
/// Tags the balancer synthesizes itself and then drops are not reported.
pub trait BalanceListener {
    /// A start tag was dropped.
    fn ignored_start_element(&mut self, name: &str, attributes: &[Attribute], location: Option<Location>);

    /// An end tag was dropped.
    fn ignored_end_element(&mut self, name: &str, location: Option<Location>);
}

impl<L: BalanceListener + ?Sized> BalanceListener for Rc<RefCell<L>> {
    fn ignored_start_element(&mut self, name: &str, attributes: &[Attribute], location: Option<Location>) {
        self.borrow_mut().ignored_start_element(name, attributes, location);
    }

    fn ignored_end_element(&mut self, name: &str, location: Option<Location>) {
        self.borrow_mut().ignored_end_element(name, location);
    }
}

/// Whether an ignored tag opened or closed an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// `<name>`
    Start,
    /// `</name>`
    End,
}

/// One dropped tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredTag {
    /// Start or end.
    pub kind: TagKind,
    /// Element name as scanned.
    pub name: String,
    /// Where the tag was, when augmentations are on.
    pub location: Option<Location>,
}

/// Listener that records what it is told.
#[derive(Debug, Default)]
pub struct IgnoredTags {
    tags: Vec<IgnoredTag>,
}

impl IgnoredTags {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dropped tags in document order.
    #[must_use]
    pub fn tags(&self) -> &[IgnoredTag] {
        &self.tags
    }

    /// Tags rendered as `<name>` or `</name>`.
    #[must_use]
    pub fn rendered(&self) -> Vec<String> {
        self.tags
            .iter()
            .map(|tag| match tag.kind {
                TagKind::Start => format!("<{}>", tag.name),
                TagKind::End => format!("</{}>", tag.name),
            })
            .collect()
    }
}

impl BalanceListener for IgnoredTags {
    fn ignored_start_element(&mut self, name: &str, _attributes: &[Attribute], location: Option<Location>) {
        self.tags.push(IgnoredTag {
            kind: TagKind::Start,
            name: name.to_string(),
            location,
        });
    }

    fn ignored_end_element(&mut self, name: &str, location: Option<Location>) {
        self.tags.push(IgnoredTag {
            kind: TagKind::End,
            name: name.to_string(),
            location,
        });
    }
}
