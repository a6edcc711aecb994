use crate::page_object::{PageContext, PageObject};
use crate::result::PomResult;

const FIRST_NAME_FIELD: &str = "firstNameField";
const LAST_NAME_FIELD: &str = "lastNameField";
const POSTAL_CODE_FIELD: &str = "postalCodeField";
const CONTINUE_BUTTON: &str = "continueButton";
const ERROR_MESSAGE: &str = "errorMessage";

/// Customer information form
#[derive(Debug, Clone)]
pub struct CheckoutPage {
    ctx: PageContext,
}

impl PageObject for CheckoutPage {
    const NAME: &'static str = "checkout";
    const URL_PATTERN: &'static str = "/checkout-step-one.html";

    fn from_context(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn context(&self) -> &PageContext {
        &self.ctx
    }
}

impl CheckoutPage {
    /// Type the first name
    pub async fn enter_first_name(&self, first_name: &str) -> PomResult<()> {
        self.ctx.type_into(FIRST_NAME_FIELD, first_name).await
    }

    /// Type the last name
    pub async fn enter_last_name(&self, last_name: &str) -> PomResult<()> {
        self.ctx.type_into(LAST_NAME_FIELD, last_name).await
    }

    /// Type the zip / postal code
    pub async fn enter_postal_code(&self, postal_code: &str) -> PomResult<()> {
        self.ctx.type_into(POSTAL_CODE_FIELD, postal_code).await
    }

    /// Fill all three fields
    pub async fn enter_details(
        &self,
        first_name: &str,
        last_name: &str,
        postal_code: &str,
    ) -> PomResult<()> {
        self.enter_first_name(first_name).await?;
        self.enter_last_name(last_name).await?;
        self.enter_postal_code(postal_code).await
    }

    /// Submit the form
    pub async fn click_continue(&self) -> PomResult<()> {
        self.ctx.click(CONTINUE_BUTTON).await
    }

    /// Validation message shown after an incomplete submit
    pub async fn error_message(&self) -> PomResult<String> {
        self.ctx.read_text(ERROR_MESSAGE).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pages::fixtures::{storefront, PASSWORD, USER};
    use crate::pages::{CartPage, InventoryPage, LoginPage};
    use crate::simulation::StorePage;

    async fn at_checkout() -> (std::sync::Arc<crate::simulation::SimulatedStorefront>, CheckoutPage) {
        let (store, factory) = storefront().await;
        factory
            .create::<LoginPage>()
            .unwrap()
            .login(USER, PASSWORD)
            .await
            .unwrap();
        let inventory: InventoryPage = factory.create().unwrap();
        inventory.add_to_cart("bike-light").await.unwrap();
        inventory.go_to_cart().await.unwrap();
        factory
            .create::<CartPage>()
            .unwrap()
            .click_checkout()
            .await
            .unwrap();
        (store, factory.create().unwrap())
    }

    #[tokio::test]
    async fn test_missing_last_name() {
        let (store, page) = at_checkout().await;
        page.enter_first_name("Ada").await.unwrap();
        page.enter_postal_code("12345").await.unwrap();
        page.click_continue().await.unwrap();

        assert_eq!(store.current_page(), StorePage::CheckoutInfo);
        assert_eq!(
            page.error_message().await.unwrap(),
            "Error: Last Name is required"
        );
    }

    #[tokio::test]
    async fn test_complete_details_continue_to_summary() {
        let (store, page) = at_checkout().await;
        page.enter_details("Ada", "Lovelace", "12345").await.unwrap();
        page.click_continue().await.unwrap();
        assert_eq!(store.current_page(), StorePage::Summary);
    }
}
