//! Products domain module.
//!
//! Business rules for votable products: the stored document shape, the voting
//! lifecycle gate, and the fixed set of vote options. Pure logic only (no IO,
//! no HTTP, no storage).

pub mod product;
pub mod vote;

pub use product::{
    DEFAULT_VOTE_WINDOW_HOURS, Locale, LocalizedContent, NewProduct, PRODUCT_COLLECTION, Pricing,
    Product, ProductId, ProductStatus, StoredProduct,
};
pub use vote::{Counts, VoteOption, VoteRequest};
