//! Element locators
//!
//! A locator is a CSS selector, optionally narrowed by text. In scenario
//! files it is either a bare selector string or a map:
//!
//! ```yaml
//! target: "#saveWebhook"
//! target: { selector: ".section-title__text", contains: "Bot Accounts" }
//! target: { selector: ".dropdown-menu", text: "Integrations" }
//! ```

use serde::Deserialize;
use std::fmt;

use crate::common::Result;

/// How to find one element on the page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "LocatorSpec")]
pub struct Locator {
    /// CSS selector for the element (or the container, with `text`)
    pub selector: String,
    /// The matched element's text must contain this
    pub contains: Option<String>,
    /// Resolve to the descendant whose whole text equals this
    pub text: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocatorSpec {
    Selector(String),
    Full {
        selector: String,
        #[serde(default)]
        contains: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
}

impl From<LocatorSpec> for Locator {
    fn from(spec: LocatorSpec) -> Self {
        match spec {
            LocatorSpec::Selector(selector) => Locator::css(selector),
            LocatorSpec::Full {
                selector,
                contains,
                text,
            } => Locator {
                selector,
                contains,
                text,
            },
        }
    }
}

impl Locator {
    /// Match by element id
    pub fn id(id: &str) -> Self {
        Self::css(format!("#{}", id))
    }

    /// Match by CSS selector
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            contains: None,
            text: None,
        }
    }

    /// Narrow to elements whose text contains `needle`
    pub fn containing(mut self, needle: impl Into<String>) -> Self {
        self.contains = Some(needle.into());
        self
    }

    /// Resolve to the descendant whose text is exactly `text`
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Apply a string transformation (template expansion) to every field
    pub fn map_strings<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<String>,
    {
        Ok(Self {
            selector: f(&self.selector)?,
            contains: self.contains.as_deref().map(&mut f).transpose()?,
            text: self.text.as_deref().map(&mut f).transpose()?,
        })
    }

    /// XPath (relative to the container) for the `text` refinement
    ///
    /// Picks the innermost element whose normalized text equals the string,
    /// so wrappers around the label do not match.
    pub fn text_xpath(text: &str) -> String {
        let literal = xpath_literal(text);
        format!(
            ".//*[normalize-space(.)={lit}][not(.//*[normalize-space(.)={lit}])]",
            lit = literal
        )
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector)?;
        if let Some(needle) = &self.contains {
            write!(f, " containing {:?}", needle)?;
        }
        if let Some(text) = &self.text {
            write!(f, " >> text {:?}", text)?;
        }
        Ok(())
    }
}

/// Quote a string as an XPath 1.0 literal
fn xpath_literal(s: &str) -> String {
    if !s.contains('"') {
        format!("\"{}\"", s)
    } else if !s.contains('\'') {
        format!("'{}'", s)
    } else {
        let parts: Vec<String> = s.split('"').map(|p| format!("\"{}\"", p)).collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}
