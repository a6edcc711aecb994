//! Flat element model and selector matching for the simulated storefront.
//!
//! Every selector is first rendered with [`Selector::query`], then matched
//! against the node list. CSS goes through `scraper` over a markup copy of
//! the nodes, so any selector it parses works; nodes are flat siblings, so
//! child and descendant combinators never match. Supported XPath is
//! `//tag`, `//tag[@attr='v']` and the two anchor-text forms produced for
//! link text locators.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::LazyLock;

use crate::locator::{Query, Selector};
use crate::result::{PomError, PomResult};

/// What clicking a node does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Submit the login form
    Login,
    /// Add a product to the cart
    AddToCart(String),
    /// Remove a product from the cart
    RemoveFromCart(String),
    /// Open the cart page
    OpenCart,
    /// Leave the cart for checkout
    Checkout,
    /// Back to the inventory from the cart
    ContinueShopping,
    /// Submit customer information
    Continue,
    /// Abandon checkout
    Cancel,
    /// Place the order
    Finish,
    /// Back to the inventory after ordering
    BackHome,
}

/// One element of a rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) tag: String,
    pub(crate) attrs: BTreeMap<String, String>,
    pub(crate) text: String,
    pub(crate) value: String,
    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    pub(crate) editable: bool,
    pub(crate) action: Option<Action>,
}

impl Node {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            visible: true,
            enabled: true,
            editable: false,
            action: None,
        }
    }

    /// Element carrying a `data-test` attribute
    pub(crate) fn tagged(tag: &str, data_test: &str) -> Self {
        Self::new(tag).attr("data-test", data_test)
    }

    pub(crate) fn attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub(crate) fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub(crate) fn input(mut self) -> Self {
        self.editable = true;
        self
    }

    pub(crate) const fn hidden(mut self, hidden: bool) -> Self {
        self.visible = !hidden;
        self
    }

    pub(crate) fn on_click(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub(crate) fn data_test(&self) -> Option<&str> {
        self.attrs.get("data-test").map(String::as_str)
    }

    /// Attribute lookup; `value` reads the live field value for inputs.
    pub(crate) fn attribute(&self, name: &str) -> Option<String> {
        if name == "value" && self.editable {
            return Some(self.value.clone());
        }
        self.attrs.get(name).cloned()
    }

    fn normalized_text(&self) -> String {
        self.text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Index of the first node matching `selector`
pub(crate) fn find_first(nodes: &[Node], selector: &Selector) -> PomResult<Option<usize>> {
    match selector.query() {
        Query::Css(css) => find_css(nodes, &css),
        Query::XPath(xpath) => {
            let matcher = parse_xpath(&xpath)?;
            Ok(nodes.iter().position(|n| matcher.matches(n)))
        }
    }
}

fn unsupported(kind: &str, query: &str) -> PomError {
    PomError::driver(format!("unsupported {kind} selector: {query}"))
}

// =============================================================================
// CSS
// =============================================================================

const INDEX_ATTR: &str = "data-sim-node";

const VOID_TAGS: [&str; 4] = ["br", "hr", "img", "input"];

fn find_css(nodes: &[Node], css: &str) -> PomResult<Option<usize>> {
    let selector = scraper::Selector::parse(css)
        .map_err(|e| PomError::driver(format!("unsupported css selector: {css} ({e})")))?;
    let document = scraper::Html::parse_fragment(&markup(nodes));
    Ok(document
        .select(&selector)
        .find_map(|el| el.value().attr(INDEX_ATTR)?.parse().ok()))
}

/// Nodes as sibling elements tagged with their index; text is left out
/// since CSS never matches on it
fn markup(nodes: &[Node]) -> String {
    let mut html = String::new();
    for (index, node) in nodes.iter().enumerate() {
        let _ = write!(html, "<{} {INDEX_ATTR}=\"{index}\"", node.tag);
        for (name, value) in &node.attrs {
            let _ = write!(html, " {name}=\"{}\"", escape_attr(value));
        }
        html.push('>');
        if !VOID_TAGS.contains(&node.tag.as_str()) {
            let _ = write!(html, "</{}>", node.tag);
        }
    }
    html
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

// =============================================================================
// XPATH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum TextTest {
    Equals(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Matcher {
    tag: Option<String>,
    attr: Option<(String, String)>,
    text: Option<TextTest>,
}

impl Matcher {
    fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(&node.tag) {
                return false;
            }
        }
        if let Some((name, value)) = &self.attr {
            if node.attrs.get(name) != Some(value) {
                return false;
            }
        }
        match &self.text {
            None => true,
            Some(TextTest::Equals(t)) => node.normalized_text() == *t,
            Some(TextTest::Contains(t)) => node.normalized_text().contains(t.as_str()),
        }
    }
}

const LITERAL: &str = r#"(?:'([^']*)'|"([^"]*)")"#;

#[allow(clippy::expect_used)]
static XPATH_ATTR: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(&format!(r"^//(\*|[A-Za-z][\w-]*)\[@([\w-]+)\s*=\s*{LITERAL}\]$"))
        .expect("xpath attribute pattern is valid")
});

#[allow(clippy::expect_used)]
static XPATH_TEXT_EQ: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(&format!(
        r"^//(\*|[A-Za-z][\w-]*)\[normalize-space\(\.\)\s*=\s*{LITERAL}\]$"
    ))
    .expect("xpath text pattern is valid")
});

#[allow(clippy::expect_used)]
static XPATH_TEXT_CONTAINS: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(&format!(
        r"^//(\*|[A-Za-z][\w-]*)\[contains\(normalize-space\(\.\),\s*{LITERAL}\)\]$"
    ))
    .expect("xpath contains pattern is valid")
});

#[allow(clippy::expect_used)]
static XPATH_TAG: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^//(\*|[A-Za-z][\w-]*)$").expect("xpath tag pattern is valid")
});

fn literal(caps: &regex::Captures<'_>, first: usize) -> String {
    caps.get(first)
        .or_else(|| caps.get(first + 1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn tag_of(caps: &regex::Captures<'_>) -> Option<String> {
    caps.get(1)
        .map(|m| m.as_str())
        .filter(|t| *t != "*")
        .map(str::to_string)
}

fn parse_xpath(xpath: &str) -> PomResult<Matcher> {
    let xpath = xpath.trim();
    if let Some(caps) = XPATH_ATTR.captures(xpath) {
        let name = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        return Ok(Matcher {
            tag: tag_of(&caps),
            attr: Some((name, literal(&caps, 3))),
            text: None,
        });
    }
    if let Some(caps) = XPATH_TEXT_EQ.captures(xpath) {
        return Ok(Matcher {
            tag: tag_of(&caps),
            attr: None,
            text: Some(TextTest::Equals(literal(&caps, 2))),
        });
    }
    if let Some(caps) = XPATH_TEXT_CONTAINS.captures(xpath) {
        return Ok(Matcher {
            tag: tag_of(&caps),
            attr: None,
            text: Some(TextTest::Contains(literal(&caps, 2))),
        });
    }
    if let Some(caps) = XPATH_TAG.captures(xpath) {
        return Ok(Matcher {
            tag: tag_of(&caps),
            attr: None,
            text: None,
        });
    }
    Err(unsupported("xpath", xpath))
}
