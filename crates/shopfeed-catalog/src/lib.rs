//! Catalog Service adapter: fetches a raw product listing and coerces it into
//! [`shopfeed_core::Product`] values the feed pipeline can consume.

pub mod client;
pub mod error;
pub mod normalize;
mod rate_limit;
pub mod types;

pub use client::CatalogClient;
pub use error::CatalogError;
pub use normalize::{normalize_product, parse_catalog};
pub use types::{RawProduct, RawSize, RawVariant};
