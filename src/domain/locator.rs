use serde::{Deserialize, Serialize};
use std::fmt;

/// How an element is found on the page.
///
/// Written as a plain string in configuration: anything starting with `/`,
/// `(` or an explicit `xpath:` prefix is an XPath expression, everything else
/// is a CSS selector. XPath covers the text-matching consent buttons that CSS
/// cannot express (`//button[contains(., 'I agree')]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Locator::XPath(expression.into())
    }

    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some(rest) = trimmed.strip_prefix("xpath:") {
            Locator::XPath(rest.trim().to_string())
        } else if trimmed.starts_with('/') || trimmed.starts_with('(') {
            Locator::XPath(trimmed.to_string())
        } else {
            Locator::Css(trimmed.to_string())
        }
    }

    pub fn expression(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::XPath(s) => s,
        }
    }
}

impl From<String> for Locator {
    fn from(raw: String) -> Self {
        Locator::parse(&raw)
    }
}

impl From<&str> for Locator {
    fn from(raw: &str) -> Self {
        Locator::parse(raw)
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        match locator {
            Locator::Css(s) => s,
            Locator::XPath(s) if s.starts_with('/') || s.starts_with('(') => s,
            Locator::XPath(s) => format!("xpath:{}", s),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css `{}`", s),
            Locator::XPath(s) => write!(f, "xpath `{}`", s),
        }
    }
}

/// One candidate lookup for a record field, relative to a review element.
/// With `attribute` set the attribute value is read instead of the inner text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldProbe {
    #[serde(rename = "selector")]
    pub locator: Locator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl FieldProbe {
    pub fn text(selector: &str) -> Self {
        Self {
            locator: Locator::parse(selector),
            attribute: None,
        }
    }

    pub fn attribute(selector: &str, attribute: &str) -> Self {
        Self {
            locator: Locator::parse(selector),
            attribute: Some(attribute.to_string()),
        }
    }
}
