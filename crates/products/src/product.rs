use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use votecast_core::{DocumentId, DomainError, DomainResult};

use crate::vote::{Counts, VoteRequest};

/// Document-store collection holding products.
pub const PRODUCT_COLLECTION: &str = "product";

/// Length of the voting window when none is configured.
pub const DEFAULT_VOTE_WINDOW_HOURS: i64 = 72;

/// Product identifier (the id the document store assigned on insert).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub DocumentId);

impl ProductId {
    pub fn new(id: DocumentId) -> Self {
        Self(id)
    }

    pub fn document_id(&self) -> DocumentId {
        self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Product status lifecycle.
///
/// Only `InVoting` accepts votes. Transitions out of it happen outside this
/// service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    InVoting,
    VoteExpired,
    Auction,
    BuyNow,
    Tokenization,
    Raffle,
    Sold,
    Rejected,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::InVoting => "in_voting",
            ProductStatus::VoteExpired => "vote_expired",
            ProductStatus::Auction => "auction",
            ProductStatus::BuyNow => "buy_now",
            ProductStatus::Tokenization => "tokenization",
            ProductStatus::Raffle => "raffle",
            ProductStatus::Sold => "sold",
            ProductStatus::Rejected => "rejected",
        }
    }

    pub fn accepts_votes(self) -> bool {
        self == ProductStatus::InVoting
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ro,
    En,
    It,
}

impl Locale {
    /// Locales a new product is published in, in display order.
    pub const PUBLISHED: [Locale; 3] = [Locale::Ro, Locale::En, Locale::It];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedContent {
    pub locale: Locale,
    pub title: String,
    pub description: Option<String>,
}

/// Optional pricing for each way a product can be disposed of after voting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub auction_start_price: Option<f64>,
    pub buy_now_price: Option<f64>,
    pub shares_total: Option<u64>,
    pub share_price: Option<f64>,
    pub raffle_tickets_total: Option<u64>,
    pub raffle_ticket_price: Option<f64>,
}

impl Pricing {
    pub fn validate(&self) -> DomainResult<()> {
        let prices = [
            ("auction_start_price", self.auction_start_price),
            ("buy_now_price", self.buy_now_price),
            ("share_price", self.share_price),
            ("raffle_ticket_price", self.raffle_ticket_price),
        ];
        for (field, price) in prices {
            if let Some(p) = price {
                if !p.is_finite() || p < 0.0 {
                    return Err(DomainError::validation(format!(
                        "{field} must be a non-negative number"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Product document as persisted in the store (the id lives beside it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub locales: Vec<LocalizedContent>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(flatten)]
    pub pricing: Pricing,
    pub vote_start_at: DateTime<Utc>,
    pub vote_end_at: DateTime<Utc>,
    pub status: ProductStatus,
    pub counts: Counts,
}

impl Product {
    /// Title in the first published locale.
    pub fn title(&self) -> &str {
        self.locales.first().map(|l| l.title.as_str()).unwrap_or_default()
    }

    pub fn ensure_accepts_votes(&self) -> DomainResult<()> {
        if !self.status.accepts_votes() {
            return Err(DomainError::invalid_state(format!(
                "voting not active (status: {})",
                self.status.as_str()
            )));
        }
        Ok(())
    }

    /// Check a vote against this product without applying it.
    pub fn validate_vote(&self, request: &VoteRequest) -> DomainResult<()> {
        self.ensure_accepts_votes()?;
        if !self.counts.contains(request.option) {
            return Err(DomainError::validation(format!(
                "invalid option: {}",
                request.option
            )));
        }
        Ok(())
    }
}

/// A product together with its store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProduct {
    pub id: ProductId,
    #[serde(flatten)]
    pub product: Product,
}

/// Input for creating a product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProduct {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub images: Vec<String>,
    pub pricing: Pricing,
    pub vote_start_at: Option<DateTime<Utc>>,
}

impl NewProduct {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Build the initial document: open for voting, every tally at zero, and
    /// the voting window starting at `vote_start_at` (or `now`).
    pub fn into_product(self, now: DateTime<Utc>, window: Duration) -> DomainResult<Product> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        self.pricing.validate()?;

        let vote_start_at = self.vote_start_at.unwrap_or(now);
        let locales = Locale::PUBLISHED
            .into_iter()
            .map(|locale| LocalizedContent {
                locale,
                title: self.title.clone(),
                description: self.description.clone(),
            })
            .collect();

        Ok(Product {
            locales,
            category: self.category,
            images: self.images,
            pricing: self.pricing,
            vote_start_at,
            vote_end_at: vote_start_at + window,
            status: ProductStatus::InVoting,
            counts: Counts::zeroed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::VoteOption;
    use chrono::TimeZone;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn default_window() -> Duration {
        Duration::hours(DEFAULT_VOTE_WINDOW_HOURS)
    }

    fn product_with_status(status: ProductStatus) -> Product {
        let mut product = NewProduct::new("Vintage lamp")
            .into_product(test_time(), default_window())
            .unwrap();
        product.status = status;
        product
    }

    #[test]
    fn new_product_opens_voting_with_default_window() {
        let product = NewProduct::new("Vintage lamp")
            .into_product(test_time(), default_window())
            .unwrap();

        assert_eq!(product.status, ProductStatus::InVoting);
        assert_eq!(product.vote_start_at, test_time());
        assert_eq!(product.vote_end_at, test_time() + Duration::hours(72));
        assert_eq!(product.counts, Counts::zeroed());
        assert_eq!(product.title(), "Vintage lamp");
    }

    #[test]
    fn explicit_start_time_shifts_the_window() {
        let start = test_time() + Duration::days(2);
        let product = NewProduct {
            vote_start_at: Some(start),
            ..NewProduct::new("Desk")
        }
        .into_product(test_time(), Duration::hours(24))
        .unwrap();

        assert_eq!(product.vote_start_at, start);
        assert_eq!(product.vote_end_at, start + Duration::hours(24));
    }

    #[test]
    fn content_is_published_in_every_locale() {
        let product = NewProduct {
            description: Some("brass, 1960s".to_string()),
            ..NewProduct::new("Lamp")
        }
        .into_product(test_time(), default_window())
        .unwrap();

        let locales: Vec<Locale> = product.locales.iter().map(|l| l.locale).collect();
        assert_eq!(locales, vec![Locale::Ro, Locale::En, Locale::It]);
        assert!(product
            .locales
            .iter()
            .all(|l| l.title == "Lamp" && l.description.as_deref() == Some("brass, 1960s")));
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = NewProduct::new("   ")
            .into_product(test_time(), default_window())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = NewProduct {
            pricing: Pricing {
                buy_now_price: Some(-1.0),
                ..Pricing::default()
            },
            ..NewProduct::new("Chair")
        }
        .into_product(test_time(), default_window())
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn only_in_voting_accepts_votes() {
        let rejecting = [
            ProductStatus::Draft,
            ProductStatus::VoteExpired,
            ProductStatus::Auction,
            ProductStatus::BuyNow,
            ProductStatus::Tokenization,
            ProductStatus::Raffle,
            ProductStatus::Sold,
            ProductStatus::Rejected,
        ];
        for status in rejecting {
            let err = product_with_status(status)
                .validate_vote(&VoteRequest::new(VoteOption::Auction))
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidState(_)), "{status:?}");
        }

        product_with_status(ProductStatus::InVoting)
            .validate_vote(&VoteRequest::new(VoteOption::Auction))
            .unwrap();
    }

    #[test]
    fn document_json_shape_matches_store_layout() {
        let product = NewProduct {
            pricing: Pricing {
                shares_total: Some(100),
                share_price: Some(2.5),
                ..Pricing::default()
            },
            ..NewProduct::new("Bike")
        }
        .into_product(test_time(), default_window())
        .unwrap();

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["status"], "in_voting");
        assert_eq!(json["shares_total"], 100);
        assert_eq!(json["share_price"], 2.5);
        assert!(json["auction_start_price"].is_null());
        assert_eq!(json["counts"]["raffle"], 0);

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn stored_product_flattens_id_beside_fields() {
        let id = ProductId::new(DocumentId::new());
        let stored = StoredProduct {
            id,
            product: product_with_status(ProductStatus::Sold),
        };

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["status"], "sold");
    }
}
