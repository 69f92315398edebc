//! StyleSense - terminal client for an AI fashion recommendation service
//!
//! Sends natural-language queries to a `POST /api/recommend` endpoint and
//! renders the returned products as a responsive card grid.
//!
//! # Features
//!
//! - **Search view**: query box, example strip, AI re-rank toggle, optional gender filter
//! - **Card grid**: title, price, rating, match badge, description and image status
//! - **Responsive layout**: result count, columns and density follow the terminal width
//! - **Latest wins**: a slow response never overwrites the results of a newer search
//!
//! # Example
//!
//! ```no_run
//! use stylesense::{AppConfig, HttpRecommender, Recommender, SearchView};
//!
//! fn main() -> stylesense::Result<()> {
//!     let config = AppConfig::load(None)?;
//!     let client = HttpRecommender::new(&config.base_url, None)?;
//!
//!     let mut view = SearchView::new(&config, 120);
//!     view.set_query("linen shirt for summer");
//!     if let Some(ticket) = view.submit() {
//!         let outcome = client.recommend(&ticket.request);
//!         view.complete(ticket.id, outcome);
//!     }
//!
//!     for card in view.cards() {
//!         println!("{} {}", card.title, card.match_badge.as_deref().unwrap_or(""));
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod card;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod tui;
pub mod view;

// Re-export main types
pub use api::{GenderFilter, HttpRecommender, Product, RecommendRequest, RecommendResponse, Recommender};
pub use card::{ImageStatus, ProductCard};
pub use config::{AppConfig, ExampleQuery};
pub use error::{Result, StyleSenseError};
pub use layout::{Layout, LayoutRules, ViewportClass};
pub use view::{Completion, Notice, SearchTicket, SearchView};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
