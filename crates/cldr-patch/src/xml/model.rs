//! XML data model and the lookups the converters need

use indexmap::IndexMap;

use crate::config::Selection;
use crate::error::{Error, Result};

/// XML document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub root: Element,
}

/// XML element
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Content>,
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
}

impl Document {
    /// Every element below the root whose name is `name`, in document order
    pub fn descendants<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.root.descendants(name)
    }
}

impl Element {
    /// Attribute value, if present
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value, or `MissingAttribute` naming this element
    pub fn required_attr(&self, name: &'static str) -> Result<&str> {
        self.attr(name).ok_or_else(|| Error::missing(&self.name, name))
    }

    /// Direct child elements named `name`, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |child| match child {
            Content::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Elements named `name` anywhere below this one, depth first in document order
    pub fn descendants<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        let mut stack: Vec<&Element> = self.child_elements().rev().collect();
        std::iter::from_fn(move || {
            while let Some(el) = stack.pop() {
                // reversed so the first child is visited first
                stack.extend(el.child_elements().rev());
                if el.name == name {
                    return Some(el);
                }
            }
            None
        })
    }

    /// Character data ahead of the first child element, whitespace included;
    /// `None` when there is none
    pub fn text(&self) -> Option<&str> {
        match self.children.first()? {
            Content::Text(text) => Some(text),
            Content::Element(_) => None,
        }
    }

    fn child_elements(&self) -> impl DoubleEndedIterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            Content::Element(el) => Some(el),
            Content::Text(_) => None,
        })
    }
}

/// Pick the single node a converter expects out of `candidates`.
///
/// `path` only names the lookup in the resulting `NotFound` error.
pub fn select_one<'a, I>(candidates: I, path: &str, selection: Selection) -> Result<&'a Element>
where
    I: IntoIterator<Item = &'a Element>,
{
    let mut iter = candidates.into_iter();
    let Some(first) = iter.next() else {
        return Err(Error::NotFound {
            path: path.to_string(),
            count: 0,
        });
    };
    match selection {
        Selection::First => Ok(first),
        Selection::Strict => {
            let extra = iter.count();
            if extra == 0 {
                Ok(first)
            } else {
                Err(Error::NotFound {
                    path: path.to_string(),
                    count: extra + 1,
                })
            }
        }
    }
}
