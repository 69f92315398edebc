//! Product card rendering rules
//!
//! Turns a [`Product`] into the strings a card shows. Missing data never
//! fails: each element is simply omitted.

use crate::api::{ImageVariant, Product, Scalar};

/// Title shown when neither the product nor its raw record has one
pub const TITLE_PLACEHOLDER: &str = "No title available";

/// Per-card image load state, used only for placeholder display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageStatus {
    /// No image URL, nothing to show
    #[default]
    Absent,
    Pending,
    Loaded,
    Failed,
    /// Has a URL, but probing is turned off
    Unchecked,
}

impl ImageStatus {
    pub fn for_url(url: Option<&str>) -> Self {
        if url.is_some() {
            ImageStatus::Pending
        } else {
            ImageStatus::Absent
        }
    }
}

/// Display-ready view of one product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub title: String,
    /// `$<value>`, hidden when there is no usable price
    pub price: Option<String>,
    pub rating: Option<String>,
    pub score: Option<f64>,
    /// `87.3% Match`
    pub match_badge: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub image: ImageStatus,
    pub explanation: Option<String>,
    pub rerank_score: Option<f64>,
    pub rank: Option<u32>,
}

impl ProductCard {
    pub fn from_product(product: &Product) -> Self {
        let image_url = image_url(product).map(str::to_string);
        Self {
            title: title(product).to_string(),
            price: price(product).map(|p| format!("${}", p)),
            rating: rating(product).map(|r| r.to_string()),
            score: product.score,
            match_badge: product.score.map(match_badge),
            description: description(product).map(str::to_string),
            image: ImageStatus::for_url(image_url.as_deref()),
            image_url,
            explanation: product
                .explanation
                .as_deref()
                .filter(|e| !e.trim().is_empty())
                .map(str::to_string),
            rerank_score: product.llm_score,
            rank: product.rank,
        }
    }
}

/// `title` else `raw.title` else the placeholder
pub fn title(product: &Product) -> &str {
    non_empty(product.title.as_deref())
        .or_else(|| non_empty(product.raw.as_ref().and_then(|r| r.title.as_deref())))
        .unwrap_or(TITLE_PLACEHOLDER)
}

/// `price` else `raw.price`
pub fn price(product: &Product) -> Option<&Scalar> {
    present(product.price.as_ref())
        .or_else(|| present(product.raw.as_ref().and_then(|r| r.price.as_ref())))
}

/// `rating` else `raw.average_rating`
pub fn rating(product: &Product) -> Option<&Scalar> {
    present(product.rating.as_ref())
        .or_else(|| present(product.raw.as_ref().and_then(|r| r.average_rating.as_ref())))
}

/// Score as a one-decimal percentage
pub fn match_badge(score: f64) -> String {
    format!("{:.1}% Match", score * 100.0)
}

/// First line of the raw description
pub fn description(product: &Product) -> Option<&str> {
    product
        .raw
        .as_ref()
        .and_then(|r| r.description.as_ref())
        .and_then(|d| d.first())
        .map(String::as_str)
        .and_then(|d| non_empty(Some(d)))
}

/// URL from the first image record: `hi_res`, then `large`, then `thumb`
pub fn image_url(product: &Product) -> Option<&str> {
    product
        .raw
        .as_ref()
        .and_then(|r| r.images.as_ref())
        .and_then(|images| images.first())
        .and_then(pick_variant)
}

pub fn pick_variant(variant: &ImageVariant) -> Option<&str> {
    [&variant.hi_res, &variant.large, &variant.thumb]
        .into_iter()
        .find_map(|v| non_empty(v.as_deref()))
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

fn present(s: Option<&Scalar>) -> Option<&Scalar> {
    s.filter(|s| s.is_present())
}
