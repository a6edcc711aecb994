use crate::page_object::{PageContext, PageObject};
use crate::result::PomResult;

const SUBTOTAL_LABEL: &str = "subtotalLabel";
const TAX_LABEL: &str = "taxLabel";
const TOTAL_LABEL: &str = "totalLabel";
const FINISH_BUTTON: &str = "finishButton";
const COMPLETE_HEADER: &str = "completeHeader";

/// Order overview and confirmation
#[derive(Debug, Clone)]
pub struct SummaryPage {
    ctx: PageContext,
}

impl PageObject for SummaryPage {
    const NAME: &'static str = "summary";
    const URL_PATTERN: &'static str = "/checkout-step-two.html";

    fn from_context(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn context(&self) -> &PageContext {
        &self.ctx
    }
}

impl SummaryPage {
    /// Wait for the total label with the default timeout
    pub async fn wait_until_loaded(&self) -> PomResult<()> {
        self.ctx.wait_until_visible(TOTAL_LABEL).await
    }

    /// Order total without the `Total: $` prefix, e.g. `10.79`
    pub async fn read_total(&self) -> PomResult<String> {
        self.read_amount(TOTAL_LABEL, "Total: $").await
    }

    /// Item total without the `Item total: $` prefix
    pub async fn read_subtotal(&self) -> PomResult<String> {
        self.read_amount(SUBTOTAL_LABEL, "Item total: $").await
    }

    /// Tax without the `Tax: $` prefix
    pub async fn read_tax(&self) -> PomResult<String> {
        self.read_amount(TAX_LABEL, "Tax: $").await
    }

    async fn read_amount(&self, key: &str, label: &str) -> PomResult<String> {
        let text = self.ctx.read_text(key).await?;
        Ok(text.replace(label, "").trim().to_string())
    }

    /// Place the order
    pub async fn finish(&self) -> PomResult<()> {
        self.ctx.click(FINISH_BUTTON).await
    }

    /// Whether the confirmation header is shown
    pub async fn is_complete(&self) -> bool {
        self.ctx.is_present(COMPLETE_HEADER).await
    }
}
