//! Concrete storefront pages.
//!
//! Each page fixes a locator file name and the element keys it uses. All
//! waiting and error context comes from [`PageContext`](crate::page_object::PageContext).

mod cart;
mod checkout;
mod inventory;
mod login;
mod summary;

pub use cart::CartPage;
pub use checkout::CheckoutPage;
pub use inventory::InventoryPage;
pub use login::LoginPage;
pub use summary::SummaryPage;

use crate::page_object::PageObject;
use crate::result::{PomError, PomResult};

/// Locator files every checkout run needs
pub const PAGE_NAMES: [&str; 5] = [
    LoginPage::NAME,
    InventoryPage::NAME,
    CartPage::NAME,
    CheckoutPage::NAME,
    SummaryPage::NAME,
];

/// Parse the cart badge text
fn parse_count(page: &str, text: &str) -> PomResult<u32> {
    text.trim().parse().map_err(|_| {
        PomError::assertion(format!(
            "cart badge on page '{page}' shows '{text}', expected a number"
        ))
    })
}
