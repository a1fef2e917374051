//! Declarative fallback chains for card fields.
//!
//! A [`FieldRule`] narrows the card to an optional scope element, then tries
//! each [`Strategy`] in order. The first strategy whose value survives
//! normalization wins; an empty value counts as absent and falls through.

use scraper::{ElementRef, Selector};

use crate::error::ConfigError;

pub fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// One way of pulling a raw string out of an element.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Concatenated text of the first matching descendant.
    DescendantText(Selector),
    /// An attribute on the element itself.
    SelfAttribute(String),
    /// An attribute on the first matching descendant.
    DescendantAttribute { selector: Selector, attribute: String },
}

impl Strategy {
    pub fn descendant_text(selector: &str) -> Result<Self, ConfigError> {
        Ok(Self::DescendantText(compile(selector)?))
    }

    pub fn self_attribute(attribute: impl Into<String>) -> Self {
        Self::SelfAttribute(attribute.into())
    }

    pub fn descendant_attribute(
        selector: &str,
        attribute: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::DescendantAttribute {
            selector: compile(selector)?,
            attribute: attribute.into(),
        })
    }

    /// Raw value before normalization, `None` when the node or attribute is missing.
    pub fn locate(&self, element: ElementRef<'_>) -> Option<String> {
        match self {
            Self::DescendantText(selector) => element
                .select(selector)
                .next()
                .map(|node| node.text().collect::<String>()),
            Self::SelfAttribute(attribute) => element.value().attr(attribute).map(str::to_string),
            Self::DescendantAttribute {
                selector,
                attribute,
            } => element
                .select(selector)
                .next()
                .and_then(|node| node.value().attr(attribute))
                .map(str::to_string),
        }
    }
}

/// Text cleanup applied to whatever a strategy located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    /// Surrounding whitespace removed.
    Trim,
    /// First whitespace-separated token, e.g. `"4.5 out of 5 stars"` -> `"4.5"`.
    FirstToken,
    /// `.` and `,` removed, e.g. `"8,232"` -> `"8232"`.
    StripGrouping,
}

impl Normalize {
    pub fn apply(self, raw: &str) -> Option<String> {
        let value = match self {
            Self::Trim => raw.trim().to_string(),
            Self::FirstToken => raw.split_whitespace().next().unwrap_or_default().to_string(),
            Self::StripGrouping => raw
                .chars()
                .filter(|c| !matches!(c, '.' | ','))
                .collect::<String>()
                .trim()
                .to_string(),
        };
        (!value.is_empty()).then_some(value)
    }
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    scope: Option<Selector>,
    strategies: Vec<Strategy>,
    normalize: Normalize,
}

impl FieldRule {
    pub fn new(normalize: Normalize) -> Self {
        Self {
            scope: None,
            strategies: Vec::new(),
            normalize,
        }
    }

    /// Run the chain against the first descendant matching `selector`
    /// instead of the card itself. A missing scope makes the field absent.
    pub fn scoped(mut self, selector: &str) -> Result<Self, ConfigError> {
        self.scope = Some(compile(selector)?);
        Ok(self)
    }

    pub fn then(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn resolve(&self, card: ElementRef<'_>) -> Option<String> {
        let base = match &self.scope {
            Some(scope) => card.select(scope).next()?,
            None => card,
        };
        self.strategies
            .iter()
            .find_map(|strategy| strategy.locate(base).and_then(|raw| self.normalize.apply(&raw)))
    }
}
