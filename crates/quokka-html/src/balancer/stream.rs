//! Pull-style access to balanced events.

use std::collections::VecDeque;
use std::rc::Rc;

use quokka_common::ErrorReporter;

use super::{BalanceListener, TagBalancer};
use crate::config::BalancerConfig;
use crate::error::Result;
use crate::event::ScanEvent;
use crate::scanner::HtmlScanner;
use crate::sink::{EventCollector, dispatch};

/// Iterator over the events of a scanner after balancing.
///
/// Each scanner event may turn into any number of balanced events; they are
/// queued and handed out one at a time.
#[derive(Debug)]
pub struct BalancedEvents {
    scanner: HtmlScanner,
    balancer: TagBalancer<EventCollector>,
    ready: VecDeque<ScanEvent>,
}

impl BalancedEvents {
    /// Balance the events `scanner` produces.
    pub fn new(scanner: HtmlScanner, config: BalancerConfig, reporter: Rc<dyn ErrorReporter>) -> Self {
        Self {
            scanner,
            balancer: TagBalancer::with_reporter(config, reporter, EventCollector::new()),
            ready: VecDeque::new(),
        }
    }

    /// Receive notifications about dropped tags.
    pub fn set_listener(&mut self, listener: Box<dyn BalanceListener>) {
        self.balancer.set_listener(listener);
    }

    /// The underlying scanner.
    #[must_use]
    pub const fn scanner(&self) -> &HtmlScanner {
        &self.scanner
    }
}

impl Iterator for BalancedEvents {
    type Item = Result<ScanEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Some(Ok(event));
            }
            match self.scanner.next_event() {
                Ok(Some(event)) => {
                    dispatch(&mut self.balancer, event);
                    self.ready.extend(self.balancer.sink_mut().take());
                }
                Ok(None) => return None,
                Err(error) => return Some(Err(error)),
            }
        }
    }
}
