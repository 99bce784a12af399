//! The stack of open elements.

use crate::catalog::{ElementCode, ElementInfo};
use crate::event::Attribute;

/// One open element.
#[derive(Debug, Clone)]
pub struct StackEntry {
    /// Catalog entry.
    pub element: &'static ElementInfo,
    /// Name as it was emitted downstream.
    pub name: String,
    /// Attributes, kept only for inline elements so they can be reopened.
    pub attributes: Vec<Attribute>,
}

impl StackEntry {
    fn matches(&self, element: &ElementInfo, name: &str) -> bool {
        self.element.code == element.code
            && (element.code != ElementCode::Unknown || self.name.eq_ignore_ascii_case(name))
    }
}

/// Open elements, outermost first.
#[derive(Debug, Default)]
pub(super) struct ElementStack {
    entries: Vec<StackEntry>,
}

impl ElementStack {
    pub(super) fn push(&mut self, entry: StackEntry) {
        self.entries.push(entry);
    }

    pub(super) fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    pub(super) fn top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub(super) fn get(&self, index: usize) -> Option<&StackEntry> {
        self.entries.get(index)
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(super) fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    /// Code of the element at `index`, counted from the bottom.
    pub(super) fn code_at(&self, index: usize) -> Option<ElementCode> {
        self.entries.get(index).map(|entry| entry.element.code)
    }

    pub(super) fn top_code(&self) -> Option<ElementCode> {
        self.top().map(|entry| entry.element.code)
    }

    /// How many entries must be popped to close `element`, or `None` when an
    /// end tag for it matches nothing open.
    ///
    /// The search never goes below `floor` (the fragment context). Unless the
    /// element is a container, it stops at the first block; a table stops it
    /// unless the element is TABLE, BODY or HTML. Unknown elements match by
    /// name.
    pub(super) fn element_depth(&self, element: &ElementInfo, name: &str, floor: usize) -> Option<usize> {
        let container = element.is_container();
        let crosses_tables = matches!(
            element.code,
            ElementCode::Table | ElementCode::Body | ElementCode::Html
        );
        let top = self.entries.len();
        for (i, entry) in self.entries.iter().enumerate().skip(floor).rev() {
            if entry.matches(element, name) {
                return Some(top - i);
            }
            if !container && entry.element.is_block() {
                return None;
            }
            if entry.element.code == ElementCode::Table && !crosses_tables {
                return None;
            }
        }
        None
    }

    /// Distance from the top to the nearest entry that is one of `parents`,
    /// searching no further than the `bounds` element.
    pub(super) fn parent_depth(&self, parents: &[ElementCode], bounds: Option<ElementCode>) -> Option<usize> {
        let top = self.entries.len();
        for (i, entry) in self.entries.iter().enumerate().rev() {
            if Some(entry.element.code) == bounds {
                break;
            }
            if parents.contains(&entry.element.code) {
                return Some(top - i);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::lookup;

    fn stack(names: &[&str]) -> ElementStack {
        let mut stack = ElementStack::default();
        for name in names {
            stack.push(StackEntry {
                element: lookup(name),
                name: (*name).to_string(),
                attributes: Vec::new(),
            });
        }
        stack
    }

    #[test]
    fn test_element_depth_stops_at_blocks_for_inline_elements() {
        let stack = stack(&["html", "body", "b", "div", "i"]);
        assert_eq!(stack.element_depth(lookup("i"), "i", 0), Some(1));
        assert_eq!(stack.element_depth(lookup("b"), "b", 0), None);
        assert_eq!(stack.element_depth(lookup("body"), "body", 0), Some(4));
    }

    #[test]
    fn test_element_depth_respects_tables_and_floor() {
        let stack = stack(&["html", "body", "p", "table", "tr", "td"]);
        assert_eq!(stack.element_depth(lookup("p"), "p", 0), None);
        assert_eq!(stack.element_depth(lookup("table"), "table", 0), Some(3));
        assert_eq!(stack.element_depth(lookup("body"), "body", 2), None);
    }

    #[test]
    fn test_unknown_elements_match_by_name() {
        let stack = stack(&["html", "body", "foo", "bar"]);
        assert_eq!(stack.element_depth(lookup("foo"), "FOO", 0), Some(2));
        assert_eq!(stack.element_depth(lookup("baz"), "baz", 0), None);
    }

    #[test]
    fn test_parent_depth_honours_bounds() {
        let stack = stack(&["html", "body", "table", "tbody", "tr", "td", "ul"]);
        let li = lookup("li");
        assert_eq!(stack.parent_depth(li.parents, li.bounds), Some(1));
        let tr = lookup("tr");
        assert_eq!(stack.parent_depth(tr.parents, tr.bounds), Some(4));

        let nested = self::stack(&["html", "body", "table", "tr", "td", "table"]);
        let td = lookup("td");
        assert_eq!(nested.parent_depth(td.parents, td.bounds), None);
    }
}
