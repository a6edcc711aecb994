use crate::page_object::{PageContext, PageObject};
use crate::result::PomResult;

use super::parse_count;

const CART_ITEM: &str = "cartItem";
const CART_BADGE: &str = "cartBadge";
const CHECKOUT_BUTTON: &str = "checkoutButton";

/// Shopping cart
#[derive(Debug, Clone)]
pub struct CartPage {
    ctx: PageContext,
}

impl PageObject for CartPage {
    const NAME: &'static str = "cart";
    const URL_PATTERN: &'static str = "/cart.html";

    fn from_context(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn context(&self) -> &PageContext {
        &self.ctx
    }
}

impl CartPage {
    /// Start checkout
    pub async fn click_checkout(&self) -> PomResult<()> {
        self.ctx.click(CHECKOUT_BUTTON).await
    }

    /// Whether a line for `item` is listed
    pub async fn has_item(&self, item: &str) -> bool {
        self.ctx.is_present_bound(CART_ITEM, "item", item).await
    }

    /// Wait for the line of `item` with the default timeout
    pub async fn wait_for_item(&self, item: &str) -> PomResult<()> {
        self.ctx.wait_until_visible_bound(CART_ITEM, "item", item).await
    }

    /// Number of items according to the cart badge
    pub async fn item_count(&self) -> PomResult<u32> {
        if !self.ctx.is_present(CART_BADGE).await {
            return Ok(0);
        }
        let text = self.ctx.read_text(CART_BADGE).await?;
        parse_count(Self::NAME, &text)
    }
}
