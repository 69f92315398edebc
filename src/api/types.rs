//! Wire contract types
//!
//! Everything the service returns about a product is optional. A field whose
//! JSON type is not what we expect is read as absent rather than failing the
//! whole response; see [`lenient`].

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Optional gender restriction accepted by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderFilter {
    Men,
    Women,
}

impl GenderFilter {
    /// Cycle none -> men -> women -> none
    pub fn cycle(current: Option<GenderFilter>) -> Option<GenderFilter> {
        match current {
            None => Some(GenderFilter::Men),
            Some(GenderFilter::Men) => Some(GenderFilter::Women),
            Some(GenderFilter::Women) => None,
        }
    }

    pub fn label(current: Option<GenderFilter>) -> &'static str {
        match current {
            None => "any",
            Some(GenderFilter::Men) => "men",
            Some(GenderFilter::Women) => "women",
        }
    }
}

impl std::str::FromStr for GenderFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "men" | "male" | "m" => Ok(GenderFilter::Men),
            "women" | "female" | "w" | "f" => Ok(GenderFilter::Women),
            other => Err(format!("unknown gender filter '{}' (use men or women)", other)),
        }
    }
}

/// Body of `POST /api/recommend`
///
/// A text search sends `q`. An image search sends `image_base64`, which the
/// service prefers over `q` when both are present; an empty `q` is omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub q: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    pub top_k: u32,
    pub rerank: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_filter: Option<GenderFilter>,
}

impl RecommendRequest {
    /// Encode raw image bytes the way the service expects (standard base64)
    pub fn encode_image(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    pub fn is_image_search(&self) -> bool {
        self.image_base64.is_some()
    }
}

/// Response of `POST /api/recommend`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Missing or `null` reads as an empty list
    #[serde(default, deserialize_with = "nullable_list")]
    pub results: Vec<Product>,
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// A value the service sends either as a number or as a string (price, rating)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Zero, NaN and empty strings count as "not provided"
    pub fn is_present(&self) -> bool {
        match self {
            Scalar::Number(n) => *n != 0.0 && !n.is_nan(),
            Scalar::Text(s) => !s.trim().is_empty(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

/// One product as returned by the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub price: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rating: Option<Scalar>,
    /// Match confidence in [0, 1]
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawProduct>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub parent_asin: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub idx: Option<u64>,

    // Present only when the re-rank pass ran
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub llm_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

/// The catalogue record the product was built from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub price: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageVariant>>,
}

/// Image URLs for one picture in several sizes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariant {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub hi_res: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub large: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

/// Deserialize any JSON value, keeping it only when it has the expected shape
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn nullable_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
