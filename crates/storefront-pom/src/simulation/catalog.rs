//! Products, prices and order totals for the simulated storefront.
//!
//! Money is kept in integer cents.

/// A product for sale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Short id used in element ids (`bike-light`)
    pub slug: String,
    /// Display name
    pub name: String,
    /// Unit price in cents
    pub price_cents: u64,
}

impl Product {
    /// Create a product
    #[must_use]
    pub fn new(slug: impl Into<String>, name: impl Into<String>, price_cents: u64) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            price_cents,
        }
    }
}

/// Product list plus tax rate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    tax_percent: u64,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// Standard storefront inventory with 8% tax
    #[must_use]
    pub fn standard() -> Self {
        Self {
            products: vec![
                Product::new("backpack", "Sauce Labs Backpack", 2999),
                Product::new("bike-light", "Sauce Labs Bike Light", 999),
                Product::new("bolt-t-shirt", "Sauce Labs Bolt T-Shirt", 1599),
                Product::new("fleece-jacket", "Sauce Labs Fleece Jacket", 4999),
                Product::new("onesie", "Sauce Labs Onesie", 799),
            ],
            tax_percent: 8,
        }
    }

    /// Add a product
    #[must_use]
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// Set the tax rate in whole percent
    #[must_use]
    pub const fn with_tax_percent(mut self, percent: u64) -> Self {
        self.tax_percent = percent;
        self
    }

    /// All products in display order
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Product by slug
    #[must_use]
    pub fn find(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug == slug)
    }

    /// Totals for the given cart
    #[must_use]
    pub fn totals<S: AsRef<str>>(&self, cart: &[S]) -> OrderTotals {
        let subtotal_cents: u64 = cart
            .iter()
            .filter_map(|slug| self.find(slug.as_ref()))
            .map(|p| p.price_cents)
            .sum();
        // round half up to the cent
        let tax_cents = (subtotal_cents * self.tax_percent + 50) / 100;
        OrderTotals {
            subtotal_cents,
            tax_cents,
            total_cents: subtotal_cents + tax_cents,
        }
    }
}

/// Subtotal, tax and total of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of item prices
    pub subtotal_cents: u64,
    /// Tax on the subtotal
    pub tax_cents: u64,
    /// Subtotal plus tax
    pub total_cents: u64,
}

/// Format cents as `12.34`
#[must_use]
pub fn format_cents(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}
