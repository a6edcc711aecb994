use crate::page_object::{PageContext, PageObject};
use crate::result::PomResult;

use super::parse_count;

const PAGE_TITLE: &str = "pageTitle";
const ADD_TO_CART_BUTTON: &str = "addToCartButton";
const CART_LINK: &str = "cartLink";
const CART_BADGE: &str = "cartBadge";

/// Product list
#[derive(Debug, Clone)]
pub struct InventoryPage {
    ctx: PageContext,
}

impl PageObject for InventoryPage {
    const NAME: &'static str = "inventory";
    const URL_PATTERN: &'static str = "/inventory.html";

    fn from_context(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn context(&self) -> &PageContext {
        &self.ctx
    }
}

impl InventoryPage {
    /// Click the add-to-cart button of `item` (e.g. `bike-light`)
    pub async fn add_to_cart(&self, item: &str) -> PomResult<()> {
        self.ctx.click_bound(ADD_TO_CART_BUTTON, "item", item).await
    }

    /// Open the cart through the header link
    pub async fn go_to_cart(&self) -> PomResult<()> {
        self.ctx.click(CART_LINK).await
    }

    /// Number on the cart badge; zero when the badge is not shown
    pub async fn cart_count(&self) -> PomResult<u32> {
        if !self.ctx.is_present(CART_BADGE).await {
            return Ok(0);
        }
        let text = self.ctx.read_text(CART_BADGE).await?;
        parse_count(Self::NAME, &text)
    }

    /// Whether the page title shows within the presence timeout
    pub async fn is_loaded(&self) -> bool {
        self.ctx.is_present(PAGE_TITLE).await
    }

    /// Wait for the page title with the default timeout
    pub async fn wait_until_loaded(&self) -> PomResult<()> {
        self.ctx.wait_until_visible(PAGE_TITLE).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pages::fixtures::{storefront, PASSWORD, USER};
    use crate::pages::LoginPage;
    use crate::result::PomError;
    use crate::simulation::StorePage;

    #[tokio::test]
    async fn test_add_items_and_open_cart() {
        let (store, factory) = storefront().await;
        let login: LoginPage = factory.create().unwrap();
        login.login(USER, PASSWORD).await.unwrap();

        let page: InventoryPage = factory.create().unwrap();
        assert!(page.is_loaded().await);
        assert_eq!(page.cart_count().await.unwrap(), 0);

        page.add_to_cart("bike-light").await.unwrap();
        page.add_to_cart("onesie").await.unwrap();
        assert_eq!(page.cart_count().await.unwrap(), 2);
        assert_eq!(store.cart(), vec!["bike-light", "onesie"]);

        page.go_to_cart().await.unwrap();
        assert_eq!(store.current_page(), StorePage::Cart);
    }

    #[tokio::test]
    async fn test_unknown_item_reports_key() {
        let (_store, factory) = storefront().await;
        let login: LoginPage = factory.create().unwrap();
        login.login(USER, PASSWORD).await.unwrap();

        let page: InventoryPage = factory.create().unwrap();
        let err = page.add_to_cart("hoverboard").await.unwrap_err();
        assert!(matches!(
            err,
            PomError::Interaction { ref key, action: "click", .. } if key == "addToCartButton"
        ));
        assert!(err.to_string().contains("hoverboard"));
    }
}
