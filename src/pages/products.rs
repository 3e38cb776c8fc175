//! Products listing page object

use anyhow::{bail, Result};

use super::session::PageSession;

const PATH: &str = "/products";
const PAGE_TITLE: &str = ".product-list .title";
const PRODUCT_CARD: &str = ".product-card";
const CART_BADGE: &str = ".cart-badge";

pub struct ProductsPage<'a> {
    session: &'a PageSession,
}

impl<'a> ProductsPage<'a> {
    pub fn new(session: &'a PageSession) -> Self {
        Self { session }
    }

    pub async fn open(&self) -> Result<()> {
        self.session.goto(PATH).await
    }

    /// The listing is considered loaded once the title is attached
    pub async fn assert_loaded(&self, timeout_ms: u64) -> Result<()> {
        if !self.session.wait_visible(PAGE_TITLE, timeout_ms).await? {
            bail!("Products page did not load within {}ms", timeout_ms);
        }
        Ok(())
    }

    /// Add a product to the cart by its visible name
    pub async fn add_to_cart(&self, product_name: &str) -> Result<()> {
        let selector = format!(
            "{}:has-text(\"{}\") button.add-to-cart",
            PRODUCT_CARD, product_name
        );
        self.session.click(&selector).await
    }

    /// Item count shown on the cart badge; 0 when the badge is absent
    pub async fn cart_count(&self) -> Result<u32> {
        if !self.session.is_visible(CART_BADGE).await? {
            return Ok(0);
        }
        let text = self.session.text_of(CART_BADGE).await?;
        Ok(text.trim().parse().unwrap_or(0))
    }
}
