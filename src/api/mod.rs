//! Recommendation service API
//!
//! Wire types for `POST /api/recommend` and the client that speaks it.

pub mod client;
pub mod types;

pub use client::{HttpRecommender, Recommender};
pub use types::{
    GenderFilter, HealthStatus, ImageVariant, Product, RawProduct, RecommendRequest,
    RecommendResponse, Scalar,
};
