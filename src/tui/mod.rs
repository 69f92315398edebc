//! Interactive terminal front end

pub mod app;
pub mod colors;
pub mod grid;
pub mod search;
pub mod ui;
pub mod worker;

use crate::api::Recommender;
use crate::config::AppConfig;
use crate::{Result, StyleSenseError};
use crossterm::{
    cursor, execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;

pub use app::{App, Focus};

/// Run the TUI until the user quits
pub fn run(config: &AppConfig, recommender: Arc<dyn Recommender>) -> Result<()> {
    let (width, _) = terminal::size().map_err(terminal_error)?;
    enable_raw_mode().map_err(terminal_error)?;

    with_restore(
        setup_terminal,
        |terminal| {
            tracing::info!(target: "tui", width, base_url = %config.base_url, "starting terminal UI");
            App::new(config, recommender, width).run(terminal)
        },
        restore_terminal,
    )
}

/// Run `body` on whatever `setup` produced, then always call `restore`,
/// including when `setup` itself failed. The first error wins.
fn with_restore<T>(
    setup: impl FnOnce() -> Result<T>,
    body: impl FnOnce(&mut T) -> Result<()>,
    restore: impl FnOnce() -> Result<()>,
) -> Result<()> {
    let result = setup().and_then(|mut target| body(&mut target));
    let restored = restore();
    result.and(restored)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(terminal_error)?;
    Terminal::new(CrosstermBackend::new(stdout)).map_err(terminal_error)
}

/// Leave raw mode and the alternate screen; safe after a partial setup
fn restore_terminal() -> Result<()> {
    disable_raw_mode().map_err(terminal_error)?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show).map_err(terminal_error)?;
    Ok(())
}

fn terminal_error(e: io::Error) -> StyleSenseError {
    StyleSenseError::Terminal(e.to_string())
}


#[cfg(test)]
pub(crate) mod testing {
    use crate::api::{HealthStatus, RecommendRequest, RecommendResponse, Recommender};
    use crate::{Result, StyleSenseError};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// In-memory recommender that records requests
    pub struct FakeRecommender {
        products: Value,
        requests: Mutex<Vec<RecommendRequest>>,
        fail_next: Mutex<Option<String>>,
        broken_images: Mutex<Vec<String>>,
    }

    impl FakeRecommender {
        pub fn with_products(products: Value) -> Self {
            Self {
                products,
                requests: Mutex::new(Vec::new()),
                fail_next: Mutex::new(None),
                broken_images: Mutex::new(Vec::new()),
            }
        }

        pub fn with_titles(titles: &[&str]) -> Self {
            let products = titles
                .iter()
                .map(|t| json!({"title": t, "score": 0.5}))
                .collect();
            Self::with_products(Value::Array(products))
        }

        pub fn requests(&self) -> Vec<RecommendRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn fail_next(&self, message: &str) {
            *self.fail_next.lock().unwrap() = Some(message.to_string());
        }

        pub fn fail_image(&self, url: &str) {
            self.broken_images.lock().unwrap().push(url.to_string());
        }
    }

    impl Recommender for FakeRecommender {
        fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(message) = self.fail_next.lock().unwrap().take() {
                return Err(StyleSenseError::Transport(message));
            }
            Ok(serde_json::from_value(json!({ "results": self.products }))?)
        }

        fn probe_image(&self, url: &str) -> Result<()> {
            if self.broken_images.lock().unwrap().iter().any(|u| u == url) {
                return Err(StyleSenseError::from_status(404, None));
            }
            Ok(())
        }

        fn health(&self) -> Result<HealthStatus> {
            Ok(HealthStatus {
                status: "ok".to_string(),
            })
        }
    }
}
