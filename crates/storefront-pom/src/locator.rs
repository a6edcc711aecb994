//! Locator descriptors and their resolution into engine selectors.
//!
//! A locator is a `(strategy, value)` pair read from a page's locator file.
//! [`resolve`] turns it into a [`Selector`] that a browser session can query.
//! Selectors keep their strategy tag; engines that only understand CSS and
//! XPath use [`Selector::query`] to get an equivalent query string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::result::{PomError, PomResult};

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// How a locator value should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocatorStrategy {
    /// `id` attribute
    Id,
    /// `name` attribute
    Name,
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
    /// Single class name
    ClassName,
    /// Tag name
    TagName,
    /// Exact anchor text
    LinkText,
    /// Substring of anchor text
    PartialLinkText,
}

impl LocatorStrategy {
    /// All supported strategies
    pub const ALL: [Self; 8] = [
        Self::Id,
        Self::Name,
        Self::Css,
        Self::XPath,
        Self::ClassName,
        Self::TagName,
        Self::LinkText,
        Self::PartialLinkText,
    ];

    /// Name used in locator files
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::ClassName => "class",
            Self::TagName => "tag",
            Self::LinkText => "linkText",
            Self::PartialLinkText => "partialLinkText",
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocatorStrategy {
    type Err = PomError;

    /// Strategy names are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "css" => Ok(Self::Css),
            "xpath" => Ok(Self::XPath),
            "class" => Ok(Self::ClassName),
            "tag" => Ok(Self::TagName),
            "linktext" => Ok(Self::LinkText),
            "partiallinktext" => Ok(Self::PartialLinkText),
            _ => Err(PomError::UnsupportedLocatorStrategy {
                page: String::new(),
                key: String::new(),
                strategy: s.to_string(),
            }),
        }
    }
}

/// A named locator loaded from a page's locator file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorDescriptor {
    key: String,
    strategy: LocatorStrategy,
    value: String,
}

impl LocatorDescriptor {
    /// Create a descriptor; the value must not be blank.
    pub fn new(
        key: impl Into<String>,
        strategy: LocatorStrategy,
        value: impl Into<String>,
    ) -> PomResult<Self> {
        let key = key.into();
        let value = value.into();
        if value.trim().is_empty() {
            return Err(PomError::LocatorParse {
                page: String::new(),
                message: format!("locator '{key}' has an empty value"),
            });
        }
        Ok(Self {
            key,
            strategy,
            value,
        })
    }

    /// Semantic key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Strategy
    #[must_use]
    pub const fn strategy(&self) -> LocatorStrategy {
        self.strategy
    }

    /// Raw value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Names of the `{placeholder}`s in the value, in order of appearance
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        PLACEHOLDER
            .captures_iter(&self.value)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// Substitute every `{name}` in the value with `replacement`
    #[must_use]
    pub fn bind(&self, name: &str, replacement: &str) -> Self {
        Self {
            key: self.key.clone(),
            strategy: self.strategy,
            value: self.value.replace(&format!("{{{name}}}"), replacement),
        }
    }
}

/// Engine-facing selector, one variant per strategy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// `id` attribute
    Id(String),
    /// `name` attribute
    Name(String),
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
    /// Single class name
    ClassName(String),
    /// Tag name
    TagName(String),
    /// Exact anchor text
    LinkText(String),
    /// Substring of anchor text
    PartialLinkText(String),
}

/// Query in one of the two languages every engine understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Strategy this selector was built from
    #[must_use]
    pub const fn strategy(&self) -> LocatorStrategy {
        match self {
            Self::Id(_) => LocatorStrategy::Id,
            Self::Name(_) => LocatorStrategy::Name,
            Self::Css(_) => LocatorStrategy::Css,
            Self::XPath(_) => LocatorStrategy::XPath,
            Self::ClassName(_) => LocatorStrategy::ClassName,
            Self::TagName(_) => LocatorStrategy::TagName,
            Self::LinkText(_) => LocatorStrategy::LinkText,
            Self::PartialLinkText(_) => LocatorStrategy::PartialLinkText,
        }
    }

    /// Raw selector value
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v)
            | Self::Name(v)
            | Self::Css(v)
            | Self::XPath(v)
            | Self::ClassName(v)
            | Self::TagName(v)
            | Self::LinkText(v)
            | Self::PartialLinkText(v) => v,
        }
    }

    /// Equivalent CSS or XPath query
    #[must_use]
    pub fn query(&self) -> Query {
        match self {
            Self::Id(v) => Query::Css(format!("[id={}]", css_string(v))),
            Self::Name(v) => Query::Css(format!("[name={}]", css_string(v))),
            Self::Css(v) => Query::Css(v.clone()),
            Self::XPath(v) => Query::XPath(v.clone()),
            Self::ClassName(v) => Query::Css(format!("[class~={}]", css_string(v))),
            Self::TagName(v) => Query::Css(v.clone()),
            Self::LinkText(v) => {
                Query::XPath(format!("//a[normalize-space(.)={}]", xpath_literal(v.trim())))
            }
            Self::PartialLinkText(v) => Query::XPath(format!(
                "//a[contains(normalize-space(.), {})]",
                xpath_literal(v)
            )),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.strategy(), self.value())
    }
}

/// Translate a descriptor into a selector.
#[must_use]
pub fn resolve(descriptor: &LocatorDescriptor) -> Selector {
    let value = descriptor.value().to_string();
    match descriptor.strategy() {
        LocatorStrategy::Id => Selector::Id(value),
        LocatorStrategy::Name => Selector::Name(value),
        LocatorStrategy::Css => Selector::Css(value),
        LocatorStrategy::XPath => Selector::XPath(value),
        LocatorStrategy::ClassName => Selector::ClassName(value),
        LocatorStrategy::TagName => Selector::TagName(value),
        LocatorStrategy::LinkText => Selector::LinkText(value),
        LocatorStrategy::PartialLinkText => Selector::PartialLinkText(value),
    }
}

/// Quote a value as a CSS string
fn css_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Quote a value as an XPath 1.0 literal (which has no escape syntax)
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{value}'")
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}
