//! In-process storefront implementing [`BrowserSession`].
//!
//! Models the six pages of the checkout flow (login, inventory, cart,
//! customer information, overview, complete) with the element ids and
//! `data-test` attributes of the public demo shop. It behaves like a slow
//! browser where it matters to the wait engine:
//!
//! - after every navigation the document reports `loading` and elements stay
//!   hidden for the configured render delay
//! - handles from a previous document fail with `StaleElement`
//! - dialogs can be raised with [`SimulatedStorefront::trigger_alert`]
//! - a closed session fails every call with a driver error

mod catalog;
mod dom;

pub use catalog::{format_cents, Catalog, OrderTotals, Product};

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::driver::{Alert, BrowserSession, ElementHandle, ElementRef, ReadyState};
use crate::locator::Selector;
use crate::result::{PomError, PomResult};
use dom::{find_first, Action, Node};

/// Storefront origin
pub const BASE_URL: &str = "https://www.saucedemo.com";
/// Login page
pub const LOGIN_URL: &str = "https://www.saucedemo.com/";
/// Product list
pub const INVENTORY_URL: &str = "https://www.saucedemo.com/inventory.html";
/// Cart
pub const CART_URL: &str = "https://www.saucedemo.com/cart.html";
/// Customer information form
pub const CHECKOUT_URL: &str = "https://www.saucedemo.com/checkout-step-one.html";
/// Order overview
pub const SUMMARY_URL: &str = "https://www.saucedemo.com/checkout-step-two.html";
/// Order confirmation
pub const COMPLETE_URL: &str = "https://www.saucedemo.com/checkout-complete.html";

/// Default account user name
pub const DEFAULT_USERNAME: &str = "standard_user";
/// Default account password
pub const DEFAULT_PASSWORD: &str = "secret_sauce";

// 1x1 transparent PNG
const BLANK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// Pages of the simulated shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorePage {
    /// `about:blank`
    Blank,
    /// Login form
    Login,
    /// Product list
    Inventory,
    /// Cart
    Cart,
    /// Customer information form
    CheckoutInfo,
    /// Order overview
    Summary,
    /// Order confirmation
    Complete,
}

impl StorePage {
    /// URL of the page
    #[must_use]
    pub const fn url(&self) -> &'static str {
        match self {
            Self::Blank => "about:blank",
            Self::Login => LOGIN_URL,
            Self::Inventory => INVENTORY_URL,
            Self::Cart => CART_URL,
            Self::CheckoutInfo => CHECKOUT_URL,
            Self::Summary => SUMMARY_URL,
            Self::Complete => COMPLETE_URL,
        }
    }

    /// Page for a URL, ignoring query and fragment
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        if url == "about:blank" {
            return Some(Self::Blank);
        }
        let rest = url.strip_prefix(BASE_URL)?;
        let path = rest.split(['?', '#']).next().unwrap_or_default();
        match path {
            "" | "/" | "/index.html" => Some(Self::Login),
            "/inventory.html" => Some(Self::Inventory),
            "/cart.html" => Some(Self::Cart),
            "/checkout-step-one.html" => Some(Self::CheckoutInfo),
            "/checkout-step-two.html" => Some(Self::Summary),
            "/checkout-complete.html" => Some(Self::Complete),
            _ => None,
        }
    }

    const fn requires_login(self) -> bool {
        !matches!(self, Self::Blank | Self::Login)
    }

    fn path(self) -> &'static str {
        self.url().strip_prefix(BASE_URL).unwrap_or("/")
    }
}

// =============================================================================
// STATE
// =============================================================================

struct ShopState {
    accounts: HashMap<String, String>,
    catalog: Catalog,
    render_delay: Duration,
    navigation_delay: Duration,
    pending: Option<(StorePage, Instant)>,

    page: StorePage,
    generation: u64,
    loaded_at: Instant,
    nodes: Vec<Node>,
    history: Vec<StorePage>,
    cursor: usize,

    logged_in: bool,
    cart: Vec<String>,
    pending_login_error: Option<String>,
    alert: Option<String>,
    disabled: HashSet<String>,
    closed: bool,
}

impl fmt::Debug for ShopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopState")
            .field("page", &self.page)
            .field("generation", &self.generation)
            .field("logged_in", &self.logged_in)
            .field("cart", &self.cart)
            .field("alert", &self.alert)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl ShopState {
    fn new() -> Self {
        let mut accounts = HashMap::new();
        let _ = accounts.insert(DEFAULT_USERNAME.to_string(), DEFAULT_PASSWORD.to_string());
        Self {
            accounts,
            catalog: Catalog::standard(),
            render_delay: Duration::ZERO,
            navigation_delay: Duration::ZERO,
            pending: None,
            page: StorePage::Blank,
            generation: 0,
            loaded_at: Instant::now(),
            nodes: Vec::new(),
            history: vec![StorePage::Blank],
            cursor: 0,
            logged_in: false,
            cart: Vec::new(),
            pending_login_error: None,
            alert: None,
            disabled: HashSet::new(),
            closed: false,
        }
    }

    fn ensure_open(&self) -> PomResult<()> {
        if self.closed {
            Err(PomError::driver("session closed"))
        } else {
            Ok(())
        }
    }

    fn loaded(&self) -> bool {
        self.loaded_at.elapsed() >= self.render_delay
    }

    /// Navigation started by a click; lands after the navigation delay
    fn follow(&mut self, page: StorePage) {
        if self.navigation_delay.is_zero() {
            self.visit(page);
        } else {
            self.pending = Some((page, Instant::now() + self.navigation_delay));
        }
    }

    /// Land a click navigation whose delay has passed
    fn settle(&mut self) {
        if let Some((page, at)) = self.pending {
            if Instant::now() >= at {
                self.pending = None;
                self.visit(page);
            }
        }
    }

    /// Navigate and record history
    fn visit(&mut self, page: StorePage) {
        self.pending = None;
        let page = self.guard(page);
        self.history.truncate(self.cursor + 1);
        self.history.push(page);
        self.cursor = self.history.len() - 1;
        self.load(page);
    }

    /// Redirect to login when the page needs a session
    fn guard(&mut self, page: StorePage) -> StorePage {
        if page.requires_login() && !self.logged_in {
            self.pending_login_error = Some(format!(
                "Epic sadface: You can only access '{}' when you are logged in.",
                page.path()
            ));
            StorePage::Login
        } else {
            page
        }
    }

    /// Replace the document without touching history
    fn load(&mut self, page: StorePage) {
        self.page = page;
        self.generation += 1;
        self.loaded_at = Instant::now();
        self.nodes = self.render(page);
        self.pending_login_error = None;
        tracing::trace!(page = ?page, generation = self.generation, "simulated page loaded");
    }

    fn field_value(&self, data_test: &str) -> String {
        self.nodes
            .iter()
            .find(|n| n.data_test() == Some(data_test))
            .map(|n| n.value.trim().to_string())
            .unwrap_or_default()
    }

    fn show_error(&mut self, message: &str) {
        if let Some(node) = self
            .nodes
            .iter_mut()
            .find(|n| n.data_test() == Some("error"))
        {
            node.text = message.to_string();
            node.visible = true;
        }
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::Login => {
                let user = self.field_value("username");
                let pass = self.field_value("password");
                if user.is_empty() {
                    self.show_error("Epic sadface: Username is required");
                } else if pass.is_empty() {
                    self.show_error("Epic sadface: Password is required");
                } else if self.accounts.get(&user) == Some(&pass) {
                    self.logged_in = true;
                    self.follow(StorePage::Inventory);
                } else {
                    self.show_error(
                        "Epic sadface: Username and password do not match any user in this service",
                    );
                }
            }
            Action::AddToCart(slug) => {
                if !self.cart.contains(&slug) {
                    self.cart.push(slug);
                }
                self.rerender_in_place();
            }
            Action::RemoveFromCart(slug) => {
                self.cart.retain(|s| *s != slug);
                self.rerender_in_place();
            }
            Action::OpenCart | Action::Cancel => self.follow(StorePage::Cart),
            Action::Checkout => self.follow(StorePage::CheckoutInfo),
            Action::ContinueShopping | Action::BackHome => self.follow(StorePage::Inventory),
            Action::Continue => {
                let missing = [
                    ("firstName", "First Name"),
                    ("lastName", "Last Name"),
                    ("postalCode", "Postal Code"),
                ]
                .into_iter()
                .find(|(field, _)| self.field_value(field).is_empty());
                match missing {
                    Some((_, label)) => self.show_error(&format!("Error: {label} is required")),
                    None => self.follow(StorePage::Summary),
                }
            }
            Action::Finish => {
                self.cart.clear();
                self.follow(StorePage::Complete);
            }
        }
    }

    /// Re-render the current page keeping handles valid
    fn rerender_in_place(&mut self) {
        let fresh = self.render(self.page);
        if fresh.len() == self.nodes.len() {
            self.nodes = fresh;
        } else {
            self.load(self.page);
        }
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    fn render(&self, page: StorePage) -> Vec<Node> {
        match page {
            StorePage::Blank => Vec::new(),
            StorePage::Login => self.render_login(),
            StorePage::Inventory => self.render_inventory(),
            StorePage::Cart => self.render_cart(),
            StorePage::CheckoutInfo => Self::render_checkout_info(),
            StorePage::Summary => self.render_summary(),
            StorePage::Complete => Self::render_complete(),
        }
    }

    fn header(&self, title: &str) -> Vec<Node> {
        let count = self.cart.len();
        vec![
            Node::tagged("span", "title").attr("class", "title").text(title),
            Node::tagged("a", "shopping-cart-link")
                .attr("class", "shopping_cart_link")
                .on_click(Action::OpenCart),
            Node::tagged("span", "shopping-cart-badge")
                .attr("class", "shopping_cart_badge")
                .text(count.to_string())
                .hidden(count == 0),
        ]
    }

    fn error_node(message: Option<&str>) -> Node {
        Node::tagged("h3", "error")
            .text(message.unwrap_or_default())
            .hidden(message.is_none())
    }

    fn render_login(&self) -> Vec<Node> {
        vec![
            Node::tagged("input", "username")
                .attr("id", "user-name")
                .attr("name", "user-name")
                .attr("placeholder", "Username")
                .input(),
            Node::tagged("input", "password")
                .attr("id", "password")
                .attr("name", "password")
                .attr("type", "password")
                .attr("placeholder", "Password")
                .input(),
            Node::tagged("input", "login-button")
                .attr("id", "login-button")
                .attr("name", "login-button")
                .attr("type", "submit")
                .attr("class", "submit-button btn_action")
                .attr("value", "Login")
                .on_click(Action::Login),
            Self::error_node(self.pending_login_error.as_deref()),
        ]
    }

    fn render_inventory(&self) -> Vec<Node> {
        let mut nodes = self.header("Products");
        for (i, product) in self.catalog.products().iter().enumerate() {
            let in_cart = self.cart.contains(&product.slug);
            let (verb, label, action) = if in_cart {
                ("remove", "Remove", Action::RemoveFromCart(product.slug.clone()))
            } else {
                ("add-to-cart", "Add to cart", Action::AddToCart(product.slug.clone()))
            };
            let button_id = format!("{verb}-sauce-labs-{}", product.slug);
            nodes.push(
                Node::new("a")
                    .attr("id", &format!("item_{i}_title_link"))
                    .text(product.name.clone()),
            );
            nodes.push(
                Node::tagged("div", "inventory-item-price")
                    .attr("class", "inventory_item_price")
                    .text(format!("${}", format_cents(product.price_cents))),
            );
            nodes.push(
                Node::tagged("button", &button_id)
                    .attr("id", &button_id)
                    .attr("name", &button_id)
                    .attr("class", "btn btn_small btn_inventory")
                    .text(label)
                    .on_click(action),
            );
        }
        nodes
    }

    fn render_cart(&self) -> Vec<Node> {
        let mut nodes = self.header("Your Cart");
        for slug in &self.cart {
            let Some(product) = self.catalog.find(slug) else {
                continue;
            };
            nodes.push(
                Node::tagged("div", &format!("cart-item-sauce-labs-{slug}"))
                    .attr("class", "cart_item")
                    .text(format!(
                        "1 {} ${}",
                        product.name,
                        format_cents(product.price_cents)
                    )),
            );
            let remove = format!("remove-sauce-labs-{slug}");
            nodes.push(
                Node::tagged("button", &remove)
                    .attr("id", &remove)
                    .attr("class", "btn btn_secondary btn_small cart_button")
                    .text("Remove")
                    .on_click(Action::RemoveFromCart(slug.clone())),
            );
        }
        nodes.push(
            Node::tagged("button", "continue-shopping")
                .attr("id", "continue-shopping")
                .attr("name", "continue-shopping")
                .text("Continue Shopping")
                .on_click(Action::ContinueShopping),
        );
        nodes.push(
            Node::tagged("button", "checkout")
                .attr("id", "checkout")
                .attr("name", "checkout")
                .attr("class", "btn btn_action btn_medium checkout_button")
                .text("Checkout")
                .on_click(Action::Checkout),
        );
        nodes
    }

    fn render_checkout_info() -> Vec<Node> {
        let field = |data_test: &str, id: &str, placeholder: &str| {
            Node::tagged("input", data_test)
                .attr("id", id)
                .attr("name", data_test)
                .attr("placeholder", placeholder)
                .input()
        };
        vec![
            Node::tagged("span", "title")
                .attr("class", "title")
                .text("Checkout: Your Information"),
            field("firstName", "first-name", "First Name"),
            field("lastName", "last-name", "Last Name"),
            field("postalCode", "postal-code", "Zip/Postal Code"),
            Node::tagged("input", "continue")
                .attr("id", "continue")
                .attr("name", "continue")
                .attr("type", "submit")
                .attr("class", "submit-button btn btn_primary cart_button btn_action")
                .attr("value", "Continue")
                .on_click(Action::Continue),
            Node::tagged("button", "cancel")
                .attr("id", "cancel")
                .attr("name", "cancel")
                .text("Cancel")
                .on_click(Action::Cancel),
            Self::error_node(None),
        ]
    }

    fn render_summary(&self) -> Vec<Node> {
        let totals = self.catalog.totals(&self.cart);
        let mut nodes = vec![Node::tagged("span", "title")
            .attr("class", "title")
            .text("Checkout: Overview")];
        for slug in &self.cart {
            if let Some(product) = self.catalog.find(slug) {
                nodes.push(
                    Node::tagged("div", "inventory-item-name")
                        .attr("class", "inventory_item_name")
                        .text(product.name.clone()),
                );
            }
        }
        nodes.extend([
            Node::tagged("div", "subtotal-label")
                .attr("class", "summary_subtotal_label")
                .text(format!("Item total: ${}", format_cents(totals.subtotal_cents))),
            Node::tagged("div", "tax-label")
                .attr("class", "summary_tax_label")
                .text(format!("Tax: ${}", format_cents(totals.tax_cents))),
            Node::tagged("div", "total-label")
                .attr("class", "summary_info_label summary_total_label")
                .text(format!("Total: ${}", format_cents(totals.total_cents))),
            Node::tagged("button", "finish")
                .attr("id", "finish")
                .attr("name", "finish")
                .attr("class", "btn btn_action btn_medium cart_button")
                .text("Finish")
                .on_click(Action::Finish),
        ]);
        nodes
    }

    fn render_complete() -> Vec<Node> {
        vec![
            Node::tagged("span", "title")
                .attr("class", "title")
                .text("Checkout: Complete!"),
            Node::tagged("h2", "complete-header")
                .attr("class", "complete-header")
                .text("Thank you for your order!"),
            Node::tagged("button", "back-to-products")
                .attr("id", "back-to-products")
                .attr("name", "back-to-products")
                .text("Back Home")
                .on_click(Action::BackHome),
        ]
    }
}

type Shared = Arc<Mutex<ShopState>>;

fn lock(state: &Shared) -> MutexGuard<'_, ShopState> {
    let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
    guard.settle();
    guard
}

// =============================================================================
// SESSION
// =============================================================================

/// Simulated storefront session
#[derive(Debug, Clone)]
pub struct SimulatedStorefront {
    state: Shared,
}

impl Default for SimulatedStorefront {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedStorefront {
    /// Create a storefront on `about:blank` with the default account
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ShopState::new())),
        }
    }

    /// Register an account
    #[must_use]
    pub fn with_account(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        let _ = lock(&self.state)
            .accounts
            .insert(username.into(), password.into());
        self
    }

    /// Delay before a freshly loaded page becomes visible and complete
    #[must_use]
    pub fn with_render_delay(self, delay: Duration) -> Self {
        lock(&self.state).render_delay = delay;
        self
    }

    /// Delay between a navigating click and the new page replacing the old
    /// one; the URL and document stay on the old page until then
    #[must_use]
    pub fn with_navigation_delay(self, delay: Duration) -> Self {
        lock(&self.state).navigation_delay = delay;
        self
    }

    /// Replace the product catalog
    #[must_use]
    pub fn with_catalog(self, catalog: Catalog) -> Self {
        lock(&self.state).catalog = catalog;
        self
    }

    /// Open a JavaScript alert
    pub fn trigger_alert(&self, text: impl Into<String>) {
        lock(&self.state).alert = Some(text.into());
    }

    /// Disable or re-enable elements by `data-test` value
    pub fn set_disabled(&self, data_test: &str, disabled: bool) {
        let mut state = lock(&self.state);
        if disabled {
            let _ = state.disabled.insert(data_test.to_string());
        } else {
            let _ = state.disabled.remove(data_test);
        }
    }

    /// Page currently shown
    #[must_use]
    pub fn current_page(&self) -> StorePage {
        lock(&self.state).page
    }

    /// Product slugs in the cart, in insertion order
    #[must_use]
    pub fn cart(&self) -> Vec<String> {
        lock(&self.state).cart.clone()
    }

    /// Whether a user is logged in
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        lock(&self.state).logged_in
    }

    /// Order totals for the current cart
    #[must_use]
    pub fn totals(&self) -> OrderTotals {
        let state = lock(&self.state);
        state.catalog.totals(&state.cart)
    }

    fn move_in_history(&self, forward: bool) -> PomResult<()> {
        let mut state = lock(&self.state);
        state.ensure_open()?;
        let target = if forward {
            (state.cursor + 1 < state.history.len()).then(|| state.cursor + 1)
        } else {
            state.cursor.checked_sub(1)
        };
        if let Some(cursor) = target {
            state.cursor = cursor;
            let page = state.history[cursor];
            let page = state.guard(page);
            state.load(page);
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for SimulatedStorefront {
    async fn navigate(&self, url: &str) -> PomResult<()> {
        let mut state = lock(&self.state);
        state.ensure_open()?;
        let page = StorePage::from_url(url).ok_or_else(|| PomError::Navigation {
            url: url.to_string(),
            message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        })?;
        state.visit(page);
        Ok(())
    }

    async fn find_element(&self, selector: &Selector) -> PomResult<ElementRef> {
        let state = lock(&self.state);
        state.ensure_open()?;
        match find_first(&state.nodes, selector)? {
            Some(index) => Ok(Arc::new(SimElement {
                state: Arc::clone(&self.state),
                generation: state.generation,
                index,
                selector: selector.to_string(),
            })),
            None => Err(PomError::ElementNotFound {
                selector: selector.to_string(),
            }),
        }
    }

    async fn ready_state(&self) -> PomResult<ReadyState> {
        let state = lock(&self.state);
        state.ensure_open()?;
        Ok(if state.loaded() {
            ReadyState::Complete
        } else {
            ReadyState::Loading
        })
    }

    async fn alert(&self) -> PomResult<Alert> {
        let state = lock(&self.state);
        state.ensure_open()?;
        state.alert.as_ref().map(Alert::new).ok_or(PomError::NoAlert)
    }

    async fn accept_alert(&self) -> PomResult<()> {
        let mut state = lock(&self.state);
        state.ensure_open()?;
        state.alert.take().map(|_| ()).ok_or(PomError::NoAlert)
    }

    async fn dismiss_alert(&self) -> PomResult<()> {
        self.accept_alert().await
    }

    async fn current_url(&self) -> PomResult<String> {
        let state = lock(&self.state);
        state.ensure_open()?;
        Ok(state.page.url().to_string())
    }

    async fn go_back(&self) -> PomResult<()> {
        self.move_in_history(false)
    }

    async fn go_forward(&self) -> PomResult<()> {
        self.move_in_history(true)
    }

    async fn refresh(&self) -> PomResult<()> {
        let mut state = lock(&self.state);
        state.ensure_open()?;
        let page = state.page;
        state.load(page);
        Ok(())
    }

    async fn screenshot(&self) -> PomResult<Vec<u8>> {
        lock(&self.state).ensure_open()?;
        Ok(BLANK_PNG.to_vec())
    }

    async fn close(&self) -> PomResult<()> {
        let mut state = lock(&self.state);
        state.closed = true;
        state.nodes.clear();
        Ok(())
    }
}

// =============================================================================
// ELEMENT
// =============================================================================

/// Handle to a node of one rendered document
#[derive(Debug)]
struct SimElement {
    state: Shared,
    generation: u64,
    index: usize,
    selector: String,
}

impl SimElement {
    /// Run `f` against the live node, failing for stale handles
    fn with_node<T>(&self, f: impl FnOnce(&mut ShopState, usize) -> PomResult<T>) -> PomResult<T> {
        let mut state = lock(&self.state);
        state.ensure_open()?;
        if state.generation != self.generation || self.index >= state.nodes.len() {
            return Err(PomError::stale(format!(
                "{} is not attached to the current document",
                self.selector
            )));
        }
        f(&mut *state, self.index)
    }

    fn displayed(state: &ShopState, index: usize) -> bool {
        state.loaded() && state.nodes[index].visible
    }

    fn enabled(state: &ShopState, index: usize) -> bool {
        let node = &state.nodes[index];
        node.enabled
            && !node
                .data_test()
                .is_some_and(|dt| state.disabled.contains(dt))
    }

    fn interactable(&self, state: &ShopState, index: usize) -> PomResult<()> {
        if Self::displayed(state, index) {
            Ok(())
        } else {
            Err(PomError::driver(format!(
                "element not interactable: {}",
                self.selector
            )))
        }
    }
}

#[async_trait]
impl ElementHandle for SimElement {
    async fn click(&self) -> PomResult<()> {
        self.with_node(|state, index| {
            self.interactable(state, index)?;
            if !Self::enabled(state, index) {
                return Ok(());
            }
            if let Some(action) = state.nodes[index].action.clone() {
                state.perform(action);
            }
            Ok(())
        })
    }

    async fn send_keys(&self, text: &str) -> PomResult<()> {
        self.with_node(|state, index| {
            self.interactable(state, index)?;
            let node = &mut state.nodes[index];
            if !node.editable {
                return Err(PomError::driver(format!(
                    "element not interactable: {} is not an input",
                    self.selector
                )));
            }
            node.value.push_str(text);
            Ok(())
        })
    }

    async fn clear(&self) -> PomResult<()> {
        self.with_node(|state, index| {
            self.interactable(state, index)?;
            state.nodes[index].value.clear();
            Ok(())
        })
    }

    async fn text(&self) -> PomResult<String> {
        self.with_node(|state, index| {
            Ok(if Self::displayed(state, index) {
                state.nodes[index].text.clone()
            } else {
                String::new()
            })
        })
    }

    async fn is_displayed(&self) -> PomResult<bool> {
        self.with_node(|state, index| Ok(Self::displayed(state, index)))
    }

    async fn is_enabled(&self) -> PomResult<bool> {
        self.with_node(|state, index| Ok(Self::enabled(state, index)))
    }

    async fn attribute(&self, name: &str) -> PomResult<Option<String>> {
        self.with_node(|state, index| Ok(state.nodes[index].attribute(name)))
    }
}
