use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use votecast_core::DomainError;
use votecast_products::{Counts, NewProduct, Pricing, VoteRequest};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /products`.
///
/// Quantities arrive as signed integers so negative values can be reported as
/// validation errors instead of deserialization failures.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub auction_start_price: Option<f64>,
    pub buy_now_price: Option<f64>,
    pub shares_total: Option<i64>,
    pub share_price: Option<f64>,
    pub raffle_tickets_total: Option<i64>,
    pub raffle_ticket_price: Option<f64>,
    pub vote_start_at: Option<DateTime<Utc>>,
}

impl TryFrom<CreateProductRequest> for NewProduct {
    type Error = DomainError;

    fn try_from(body: CreateProductRequest) -> Result<Self, Self::Error> {
        Ok(NewProduct {
            title: body.title,
            description: body.description,
            category: body.category,
            images: body.images,
            pricing: Pricing {
                auction_start_price: body.auction_start_price,
                buy_now_price: body.buy_now_price,
                shares_total: non_negative("shares_total", body.shares_total)?,
                share_price: body.share_price,
                raffle_tickets_total: non_negative(
                    "raffle_tickets_total",
                    body.raffle_tickets_total,
                )?,
                raffle_ticket_price: body.raffle_ticket_price,
            },
            vote_start_at: body.vote_start_at,
        })
    }
}

fn non_negative(field: &str, value: Option<i64>) -> Result<Option<u64>, DomainError> {
    value
        .map(|v| {
            u64::try_from(v)
                .map_err(|_| DomainError::validation(format!("{field} must be non-negative")))
        })
        .transpose()
}

/// Body of `POST /products/{id}/vote`.
#[derive(Debug, Deserialize)]
pub struct VoteBody {
    pub option: String,
    pub desired_shares: Option<i64>,
    pub desired_tickets: Option<i64>,
}

impl TryFrom<VoteBody> for VoteRequest {
    type Error = DomainError;

    fn try_from(body: VoteBody) -> Result<Self, Self::Error> {
        VoteRequest::parse(&body.option, body.desired_shares, body.desired_tickets)
    }
}

// -------------------------
// Response DTOs
// -------------------------

/// Success envelope: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Serialize)]
pub struct VoteResult {
    pub ok: bool,
    pub counts: Counts,
}
