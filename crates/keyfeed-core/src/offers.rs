use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// One sellable unit in the output feed, keyed by SKU.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    /// Resolved SKU (or the product identifier for a product without variants).
    /// Never empty.
    pub id: String,
    pub name: String,
    /// Non-negative selling price.
    pub price: Decimal,
    /// Pre-discount price. Only set when strictly greater than `price`.
    pub old_price: Option<Decimal>,
    /// ISO 4217 currency code, e.g. `"UAH"`.
    pub currency_id: String,
    pub stock: u64,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub category_id: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub params: Vec<OfferParam>,
    /// Picture URLs, deduplicated, in first-seen order.
    pub pictures: Vec<String>,
}

impl Offer {
    /// `true` exactly when there is stock on hand.
    #[must_use]
    pub fn available(&self) -> bool {
        self.stock > 0
    }

    /// Price rendered with exactly two decimal places, e.g. `"100.00"`.
    #[must_use]
    pub fn price_text(&self) -> String {
        format_money(self.price)
    }

    #[must_use]
    pub fn old_price_text(&self) -> Option<String> {
        self.old_price.map(format_money)
    }
}

/// A generic `<param name="...">value</param>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferParam {
    pub name: String,
    pub value: String,
}

/// A node of the merchant's category tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub parent_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopMeta {
    pub name: String,
    pub company: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    pub id: String,
    pub rate: String,
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            id: "UAH".to_string(),
            rate: "1".to_string(),
        }
    }
}

/// Everything the serializer needs for one generation run.
#[derive(Debug, Clone)]
pub struct FeedDocument {
    pub generated_at: DateTime<Utc>,
    pub shop: ShopMeta,
    pub currency: Currency,
    /// `None` omits the `<categories>` block entirely.
    pub categories: Option<Vec<Category>>,
    pub offers: Vec<Offer>,
}

/// Rounds a money amount to two fractional digits, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a decimal amount with exactly two fractional digits.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let mut rounded = round_money(amount);
    rounded.rescale(2);
    rounded.to_string()
}
