use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

/// Where the `index`-th member of a group lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Member {
    /// The container itself.
    Root,
    /// A descendant, by position in `querySelectorAll` order.
    Descendant(u32),
    Missing,
}

/// Group size when the container matches (`root_matches`) or holds
/// `descendants` matches.
fn group_size(root_matches: bool, descendants: u32) -> usize {
    if root_matches {
        1
    } else {
        descendants as usize
    }
}

fn locate(root_matches: bool, descendants: u32, index: usize) -> Member {
    if index >= group_size(root_matches, descendants) {
        Member::Missing
    } else if root_matches {
        Member::Root
    } else {
        Member::Descendant(index as u32)
    }
}

/// Element lookup confined to a page's container.
///
/// Layout reads and style writes both go through here, so the element at
/// a group index is the one that was counted for it.
#[derive(Clone)]
pub struct DomScope {
    document: Document,
    container: Option<String>,
}

impl DomScope {
    /// Lookups inside the first element matching `container`, or the whole
    /// document when absent.
    #[must_use]
    pub fn new(document: Document, container: Option<String>) -> Self {
        Self {
            document,
            container,
        }
    }

    /// The document being read.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn root(&self) -> Option<Element> {
        match &self.container {
            Some(selector) => self.document.query_selector(selector).ok().flatten(),
            None => self.document.document_element(),
        }
    }

    /// Number of elements matching `selector`. A container that matches
    /// the selector itself counts as the only member.
    #[must_use]
    pub fn count(&self, selector: &str) -> usize {
        let Some(root) = self.root() else {
            return 0;
        };
        let root_matches = root.matches(selector).unwrap_or(false);
        let descendants = if root_matches {
            0
        } else {
            root.query_selector_all(selector).map_or(0, |nodes| nodes.length())
        };
        group_size(root_matches, descendants)
    }

    /// The `index`-th element matching `selector`, in document order.
    #[must_use]
    pub fn nth(&self, selector: &str, index: usize) -> Option<Element> {
        let root = self.root()?;
        if root.matches(selector).unwrap_or(false) {
            return match locate(true, 0, index) {
                Member::Root => Some(root),
                _ => None,
            };
        }
        let nodes = root.query_selector_all(selector).ok()?;
        match locate(false, nodes.length(), index) {
            Member::Descendant(i) => nodes.item(i)?.dyn_into::<Element>().ok(),
            _ => None,
        }
    }

    /// Like [`nth`](Self::nth), for elements that carry inline styles.
    #[must_use]
    pub fn nth_html(&self, selector: &str, index: usize) -> Option<HtmlElement> {
        self.nth(selector, index)?.dyn_into::<HtmlElement>().ok()
    }
}
