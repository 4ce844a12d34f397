//! Element model
//!
//! Canonical representation of an interactive control discovered on a target page.
//! Elements are produced by the discovery step and consumed read-only by synthesis.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Identifier of a discovered element, unique within a discovery run
pub type ElementId = String;

/// Kind of interactive control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Clickable button
    Button,
    /// Text-like input field
    Input,
    /// Anchor link
    Link,
    /// Form container
    Form,
    /// Drop-down select
    Select,
    /// Multi-line text area
    Textarea,
}

impl ElementKind {
    /// Get all element kinds
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Button,
            Self::Input,
            Self::Link,
            Self::Form,
            Self::Select,
            Self::Textarea,
        ]
    }

    /// Whether synthesis emits specifications for this kind
    #[must_use]
    pub const fn is_synthesized(&self) -> bool {
        matches!(self, Self::Button | Self::Input | Self::Link | Self::Form)
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Button => write!(f, "button"),
            Self::Input => write!(f, "input"),
            Self::Link => write!(f, "link"),
            Self::Form => write!(f, "form"),
            Self::Select => write!(f, "select"),
            Self::Textarea => write!(f, "textarea"),
        }
    }
}

/// On-page position of an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset in CSS pixels
    pub x: f64,
    /// Vertical offset in CSS pixels
    pub y: f64,
}

/// How generated code looks an element up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator<'a> {
    /// CSS selector
    Css(&'a str),
    /// XPath expression
    XPath(&'a str),
}

/// A discovered interactive control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique element ID
    pub id: ElementId,
    /// Control kind
    pub kind: ElementKind,
    /// CSS selector in the target framework's syntax
    pub selector: String,
    /// Visible text, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    /// DOM attributes
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// XPath-style locator path
    #[serde(default)]
    pub locator_path: String,
    /// Position on the page
    #[serde(default)]
    pub position: Position,
}

impl Element {
    /// Create a new element with no text or attributes
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ElementKind, selector: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            selector: selector.into(),
            display_text: None,
            attributes: BTreeMap::new(),
            locator_path: String::new(),
            position: Position::default(),
        }
    }

    /// Set display text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.display_text = Some(text.into());
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set locator path
    #[must_use]
    pub fn with_locator_path(mut self, path: impl Into<String>) -> Self {
        self.locator_path = path.into();
        self
    }

    /// Set position
    #[must_use]
    pub const fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    /// Get an attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Human-readable label: display text, then `name`/`aria-label`, then the ID
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| self.attribute("aria-label"))
            .or_else(|| self.attribute("name"))
            .unwrap_or(self.id.as_str())
    }

    /// Whether the element has a selector or a locator path to be found by
    #[must_use]
    pub fn has_locator(&self) -> bool {
        !self.selector.trim().is_empty() || !self.locator_path.trim().is_empty()
    }

    /// Selector when present, otherwise the locator path as XPath
    #[must_use]
    pub fn locator(&self) -> Locator<'_> {
        if self.selector.trim().is_empty() && !self.locator_path.trim().is_empty() {
            Locator::XPath(&self.locator_path)
        } else {
            Locator::Css(&self.selector)
        }
    }
}

/// IDs that appear more than once, in first-repeat order
#[must_use]
pub fn duplicate_ids(elements: &[Element]) -> Vec<ElementId> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for element in elements {
        if !seen.insert(element.id.as_str()) && reported.insert(element.id.as_str()) {
            duplicates.push(element.id.clone());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_locator() {
        assert!(Element::new("a", ElementKind::Button, "#a").has_locator());
        assert!(
            Element::new("b", ElementKind::Button, " ")
                .with_locator_path("//button[1]")
                .has_locator()
        );
        assert!(!Element::new("c", ElementKind::Button, "  ").has_locator());
    }

    #[test]
    fn test_element_builder() {
        let el = Element::new("btn-1", ElementKind::Button, "#submit")
            .with_text("Submit")
            .with_attribute("type", "submit")
            .with_locator_path("/html/body/button[1]")
            .with_position(10.0, 20.0);

        assert_eq!(el.kind, ElementKind::Button);
        assert_eq!(el.attribute("type"), Some("submit"));
        assert_eq!(el.label(), "Submit");
        assert!((el.position.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_label_fallbacks() {
        let el = Element::new("in-1", ElementKind::Input, "#q").with_attribute("name", "query");
        assert_eq!(el.label(), "query");

        let blank = Element::new("in-2", ElementKind::Input, "#q").with_text("   ");
        assert_eq!(blank.label(), "in-2");
    }

    #[test]
    fn test_locator_prefers_selector() {
        let el = Element::new("a", ElementKind::Link, "a.nav").with_locator_path("//a[1]");
        assert_eq!(el.locator(), Locator::Css("a.nav"));

        let no_css = Element::new("b", ElementKind::Link, "").with_locator_path("//a[2]");
        assert_eq!(no_css.locator(), Locator::XPath("//a[2]"));
    }

    #[test]
    fn test_synthesized_kinds() {
        assert!(ElementKind::Button.is_synthesized());
        assert!(ElementKind::Form.is_synthesized());
        assert!(!ElementKind::Select.is_synthesized());
        assert!(!ElementKind::Textarea.is_synthesized());
    }

    #[test]
    fn test_duplicate_ids_reported_once() {
        let elements = vec![
            Element::new("x", ElementKind::Button, "#a"),
            Element::new("y", ElementKind::Button, "#b"),
            Element::new("x", ElementKind::Link, "#c"),
            Element::new("x", ElementKind::Link, "#d"),
        ];
        assert_eq!(duplicate_ids(&elements), vec!["x".to_string()]);
    }

    #[test]
    fn test_element_deserialize_camel_case() {
        let json = r##"{
            "id": "e1",
            "kind": "input",
            "selector": "#email",
            "displayText": "Email",
            "attributes": {"type": "email"},
            "locatorPath": "/html/body/input",
            "position": {"x": 1.0, "y": 2.0}
        }"##;
        let el: Element = serde_json::from_str(json).expect("deserialize");
        assert_eq!(el.kind, ElementKind::Input);
        assert_eq!(el.display_text.as_deref(), Some("Email"));
        assert_eq!(el.locator_path, "/html/body/input");
    }

    #[test]
    fn test_element_kind_display() {
        assert_eq!(ElementKind::Textarea.to_string(), "textarea");
        assert_eq!(ElementKind::all().len(), 6);
    }
}
