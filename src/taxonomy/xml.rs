//! Owned view of the `LearningStandardItem` fragments of a document.
//!
//! `roxmltree` trees borrow their source text, while nodes outlive the load
//! call that parsed them, so each entry is copied into an [`Element`].

use std::fs;
use std::path::Path;

use super::error::{Result, TaxonomyError};

pub const ENTRY_TAG: &str = "LearningStandardItem";

/// Read-only capability the engine needs from a document fragment.
///
/// Paths are `/`-separated child element names relative to the node; names
/// are compared without namespace prefixes.
pub trait XmlNode: Sized {
    fn is_tag(&self, tag: &str) -> bool;

    fn attribute(&self, name: &str) -> Option<&str>;

    fn children(&self) -> &[Self];

    /// Concatenated text of the node and its descendants.
    fn text(&self) -> &str;

    fn select(&self, path: &str) -> Vec<&Self> {
        let mut current = vec![self];
        for step in path.split('/').filter(|step| !step.is_empty() && *step != ".") {
            current = current
                .into_iter()
                .flat_map(|node| {
                    node.children()
                        .iter()
                        .filter(move |child| child.is_tag(step))
                })
                .collect();
        }
        current
    }

    /// Trimmed value of the first attribute present among `names`.
    fn first_attribute(&self, names: &[&str]) -> Option<String> {
        names
            .iter()
            .find_map(|name| self.attribute(name))
            .map(|value| value.trim().to_string())
    }

    fn first_text(&self, path: &str) -> Option<String> {
        self.select(path)
            .first()
            .map(|node| node.text().trim().to_string())
    }

    fn texts(&self, path: &str) -> Vec<String> {
        self.select(path)
            .into_iter()
            .map(|node| node.text().trim().to_string())
            .collect()
    }

    /// Elements at `path` paired with their `type_attribute` value.
    fn markers(&self, path: &str, type_attribute: &str) -> Vec<Marker> {
        self.select(path)
            .into_iter()
            .map(|node| Marker {
                relationship: node
                    .attribute(type_attribute)
                    .map(|value| value.trim().to_string()),
                target: node.text().trim().to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub relationship: Option<String>,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let attributes = node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect();
        let text = node
            .descendants()
            .filter(|child| child.is_text())
            .filter_map(|child| child.text())
            .collect::<String>();
        let children = node
            .children()
            .filter(|child| child.is_element())
            .map(Element::from_node)
            .collect();

        Self {
            name: node.tag_name().name().to_string(),
            attributes,
            text,
            children,
        }
    }
}

impl XmlNode for Element {
    fn is_tag(&self, tag: &str) -> bool {
        self.name == tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn text(&self) -> &str {
        &self.text
    }
}

fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}

/// Parses `text` and returns every entry fragment in document order.
pub fn parse_entries(document: &str, text: &str) -> Result<Vec<Element>> {
    let doc = roxmltree::Document::parse_with_options(text, parsing_options()).map_err(|e| {
        TaxonomyError::XmlParse {
            document: document.to_string(),
            message: e.to_string(),
        }
    })?;

    Ok(doc
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == ENTRY_TAG)
        .map(Element::from_node)
        .collect())
}

pub fn read_entries(path: &Path) -> Result<Vec<Element>> {
    let text = fs::read_to_string(path)?;
    parse_entries(&path.display().to_string(), &text)
}
