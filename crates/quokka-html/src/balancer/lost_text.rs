//! Text seen before any element was open.

use crate::event::Location;
use crate::scanner::is_space;

/// Character data held back until a BODY exists to receive it.
#[derive(Debug, Default)]
pub(super) struct LostText {
    entries: Vec<(String, Option<Location>)>,
}

impl LostText {
    /// Queue `text`. Leading whitespace-only chunks are dropped.
    pub(super) fn add(&mut self, text: String, location: Option<Location>) {
        if self.entries.is_empty() && text.chars().all(is_space) {
            return;
        }
        self.entries.push((text, location));
    }

    pub(super) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove every queued chunk, in arrival order.
    pub(super) fn take(&mut self) -> Vec<(String, Option<Location>)> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_whitespace_is_dropped() {
        let mut lost = LostText::default();
        lost.add("  \n".to_string(), None);
        assert!(lost.is_empty());
        lost.add("a".to_string(), None);
        lost.add(" ".to_string(), None);
        let texts: Vec<String> = lost.take().into_iter().map(|(text, _)| text).collect();
        assert_eq!(texts, ["a", " "]);
        assert!(lost.is_empty());
    }
}
