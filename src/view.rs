//! Search view state
//!
//! [`SearchView`] owns the query, the re-rank flag, the live result set and
//! the loading/notice flags. It does no I/O: [`SearchView::submit`] hands back
//! a [`SearchTicket`] describing the one request to issue, and the caller
//! reports the outcome through [`SearchView::complete`].
//!
//! Every ticket carries an id. Only the most recently issued id is accepted
//! on completion, so a slow earlier response cannot overwrite newer results.

use crate::api::{GenderFilter, Product, RecommendRequest, RecommendResponse};
use crate::card::{ImageStatus, ProductCard};
use crate::config::{AppConfig, ExampleQuery};
use crate::layout::{Layout, LayoutRules};
use crate::StyleSenseError;
use chrono::{DateTime, Local};
use std::time::Instant;

/// A request the view wants issued
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    pub id: u64,
    pub request: RecommendRequest,
}

/// What [`SearchView::complete`] did with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Results replaced
    Replaced,
    /// Error surfaced, results kept
    Failed,
    /// Not the latest request; ignored
    Stale,
}

/// Blocking notification that must be dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn error(err: &StyleSenseError) -> Self {
        Self {
            title: "Error".to_string(),
            message: format!("Error: {}", err),
        }
    }
}

struct InFlight {
    id: u64,
    started: Instant,
}

pub struct SearchView {
    query: String,
    rerank: bool,
    gender_filter: Option<GenderFilter>,
    examples: Vec<ExampleQuery>,

    rules: LayoutRules,
    layout: Layout,

    results: Vec<Product>,
    cards: Vec<ProductCard>,
    /// Bumped whenever the result set is replaced
    generation: u64,

    loading: bool,
    in_flight: Option<InFlight>,
    next_id: u64,
    search_time_ms: Option<u64>,
    last_search_at: Option<DateTime<Local>>,
    notice: Option<Notice>,
}

impl SearchView {
    pub fn new(config: &AppConfig, width: u16) -> Self {
        let rules = LayoutRules::from(config);
        Self {
            query: config.initial_query.clone(),
            rerank: config.rerank,
            gender_filter: config.gender_filter,
            examples: config.examples.clone(),
            layout: rules.compute(width),
            rules,
            results: Vec::new(),
            cards: Vec::new(),
            generation: 0,
            loading: false,
            in_flight: None,
            next_id: 1,
            search_time_ms: None,
            last_search_at: None,
            notice: None,
        }
    }

    // --- Operations ---

    /// Issue a request for the current query. `None` when the trimmed query is empty.
    pub fn submit(&mut self) -> Option<SearchTicket> {
        let trimmed = self.query.trim().to_string();
        if trimmed.is_empty() {
            return None;
        }
        Some(self.issue(trimmed))
    }

    /// Put the example's text in the search box and submit exactly that text
    pub fn select_example(&mut self, example: &ExampleQuery) -> Option<SearchTicket> {
        self.query = example.text.clone();
        let text = example.text.trim().to_string();
        if text.is_empty() {
            return None;
        }
        Some(self.issue(text))
    }

    /// Issue an image search. The trimmed query, when non-empty, is sent along as `q`.
    pub fn submit_image(&mut self, image_base64: String) -> SearchTicket {
        let q = self.query.trim().to_string();
        let mut ticket = self.issue(q);
        ticket.request.image_base64 = Some(image_base64);
        ticket
    }

    fn issue(&mut self, q: String) -> SearchTicket {
        let id = self.next_id;
        self.next_id += 1;

        self.loading = true;
        self.in_flight = Some(InFlight {
            id,
            started: Instant::now(),
        });

        let request = RecommendRequest {
            q,
            image_base64: None,
            top_k: self.layout.top_k,
            rerank: self.rerank,
            gender_filter: self.gender_filter,
        };
        tracing::info!(
            target: "view",
            id,
            q = %request.q,
            top_k = request.top_k,
            rerank = request.rerank,
            "search submitted"
        );
        SearchTicket { id, request }
    }

    /// Apply the outcome of the request with the given id
    pub fn complete(
        &mut self,
        id: u64,
        outcome: crate::Result<RecommendResponse>,
    ) -> Completion {
        let started = match &self.in_flight {
            Some(in_flight) if in_flight.id == id => in_flight.started,
            _ => {
                tracing::debug!(target: "view", id, "ignoring stale response");
                return Completion::Stale;
            }
        };
        self.in_flight = None;
        self.loading = false;

        match outcome {
            Ok(response) => {
                let elapsed = started.elapsed().as_millis() as u64;
                self.search_time_ms = Some(elapsed);
                self.last_search_at = Some(Local::now());
                self.replace_results(response.results);
                tracing::info!(
                    target: "view",
                    id,
                    results = self.results.len(),
                    elapsed_ms = elapsed,
                    "results replaced"
                );
                Completion::Replaced
            }
            Err(err) => {
                tracing::warn!(target: "view", id, error = %err, "search failed");
                self.notice = Some(Notice::error(&err));
                Completion::Failed
            }
        }
    }

    fn replace_results(&mut self, results: Vec<Product>) {
        self.cards = results.iter().map(ProductCard::from_product).collect();
        self.results = results;
        self.generation += 1;
    }

    /// Recompute the layout for a new width. Returns true when it changed.
    pub fn resize(&mut self, width: u16) -> bool {
        let layout = self.rules.compute(width);
        let changed = layout != self.layout;
        self.layout = layout;
        changed
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    pub fn toggle_rerank(&mut self) -> bool {
        self.rerank = !self.rerank;
        self.rerank
    }

    pub fn cycle_gender_filter(&mut self) -> Option<GenderFilter> {
        self.gender_filter = GenderFilter::cycle(self.gender_filter);
        self.gender_filter
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Record an image probe result. Ignored when the result set has since been replaced.
    pub fn set_image_status(&mut self, generation: u64, index: usize, status: ImageStatus) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.cards.get_mut(index) {
            Some(card) if card.image_url.is_some() => {
                card.image = status;
                true
            }
            _ => false,
        }
    }

    /// Settle every pending image without probing it. Returns how many changed.
    pub fn mark_images_unchecked(&mut self) -> usize {
        let mut changed = 0;
        for card in self.cards.iter_mut().filter(|c| c.image == ImageStatus::Pending) {
            card.image = ImageStatus::Unchecked;
            changed += 1;
        }
        changed
    }

    /// Cards whose image still needs probing, with their index
    pub fn pending_images(&self) -> Vec<(usize, String)> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, c)| c.image == ImageStatus::Pending)
            .filter_map(|(i, c)| c.image_url.clone().map(|u| (i, u)))
            .collect()
    }

    // --- Accessors ---

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn rerank(&self) -> bool {
        self.rerank
    }

    pub fn gender_filter(&self) -> Option<GenderFilter> {
        self.gender_filter
    }

    pub fn examples(&self) -> &[ExampleQuery] {
        &self.examples
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn results(&self) -> &[Product] {
        &self.results
    }

    pub fn cards(&self) -> &[ProductCard] {
        &self.cards
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        !self.loading && !self.query.trim().is_empty()
    }

    pub fn search_time_ms(&self) -> Option<u64> {
        self.search_time_ms
    }

    pub fn last_search_at(&self) -> Option<DateTime<Local>> {
        self.last_search_at
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view(width: u16) -> SearchView {
        SearchView::new(&AppConfig::default(), width)
    }

    fn response(value: serde_json::Value) -> RecommendResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn blank_queries_never_issue_requests() {
        let mut v = view(120);
        for q in ["", "   ", "\t\n"] {
            v.set_query(q);
            assert_eq!(v.submit(), None);
            assert!(!v.is_loading());
            assert!(!v.can_submit());
        }
        assert!(v.results().is_empty());
    }

    #[test]
    fn blank_submit_leaves_results_alone() {
        let mut v = view(120);
        let t = v.submit().unwrap();
        v.complete(t.id, Ok(response(json!({"results": [{"title": "a"}]}))));
        v.set_query("  ");
        assert_eq!(v.submit(), None);
        assert_eq!(v.results().len(), 1);
    }

    #[test]
    fn ticket_carries_trimmed_query_flag_and_page_size() {
        let mut v = view(160);
        v.set_query("  linen summer dress ");
        v.toggle_rerank();
        let ticket = v.submit().unwrap();
        assert_eq!(ticket.request.q, "linen summer dress");
        assert!(ticket.request.rerank);
        assert_eq!(ticket.request.top_k, 12);
        assert!(v.is_loading());

        let mut v = view(60);
        let ticket = v.submit().unwrap();
        assert_eq!(ticket.request.top_k, 6);
        assert!(!ticket.request.rerank);
    }

    #[test]
    fn each_submit_issues_one_request() {
        let mut v = view(120);
        let a = v.submit().unwrap();
        let b = v.submit().unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn response_replaces_results_in_order() {
        let mut v = view(120);
        let t = v.submit().unwrap();
        let outcome = v.complete(
            t.id,
            Ok(response(json!({"results": [{"title": "p1"}, {"title": "p2"}]}))),
        );
        assert_eq!(outcome, Completion::Replaced);
        assert_eq!(v.results().len(), 2);
        assert_eq!(v.cards()[0].title, "p1");
        assert_eq!(v.cards()[1].title, "p2");
        assert!(!v.is_loading());
        assert!(v.search_time_ms().is_some());
        assert!(v.notice().is_none());
    }

    #[test]
    fn missing_results_empties_the_set_without_error() {
        let mut v = view(120);
        let t = v.submit().unwrap();
        v.complete(t.id, Ok(response(json!({"results": [{"title": "old"}]}))));

        let t = v.submit().unwrap();
        let outcome = v.complete(t.id, Ok(response(json!({"query": "x"}))));
        assert_eq!(outcome, Completion::Replaced);
        assert!(v.results().is_empty());
        assert!(v.notice().is_none());
    }

    #[test]
    fn failure_keeps_results_and_raises_notice() {
        let mut v = view(120);
        let t = v.submit().unwrap();
        v.complete(t.id, Ok(response(json!({"results": [{"title": "kept"}]}))));
        let before = v.results().to_vec();

        let t = v.submit().unwrap();
        let outcome = v.complete(
            t.id,
            Err(StyleSenseError::Transport("connection refused".into())),
        );
        assert_eq!(outcome, Completion::Failed);
        assert_eq!(v.results(), before.as_slice());
        assert!(!v.is_loading());
        let notice = v.notice().unwrap();
        assert!(notice.message.contains("connection refused"));

        assert!(v.dismiss_notice().is_some());
        assert!(v.notice().is_none());
    }

    #[test]
    fn stale_responses_are_ignored() {
        let mut v = view(120);
        let first = v.submit().unwrap();
        v.set_query("second");
        let second = v.submit().unwrap();

        let outcome = v.complete(
            second.id,
            Ok(response(json!({"results": [{"title": "new"}]}))),
        );
        assert_eq!(outcome, Completion::Replaced);

        let outcome = v.complete(
            first.id,
            Ok(response(json!({"results": [{"title": "old"}, {"title": "older"}]}))),
        );
        assert_eq!(outcome, Completion::Stale);
        assert_eq!(v.results().len(), 1);
        assert_eq!(v.cards()[0].title, "new");
    }

    #[test]
    fn stale_failure_does_not_clear_loading() {
        let mut v = view(120);
        let first = v.submit().unwrap();
        let _second = v.submit().unwrap();
        let outcome = v.complete(first.id, Err(StyleSenseError::Transport("x".into())));
        assert_eq!(outcome, Completion::Stale);
        assert!(v.is_loading());
        assert!(v.notice().is_none());
    }

    #[test]
    fn example_selection_submits_its_text() {
        let mut v = view(120);
        let example = v.examples()[2].clone();
        let ticket = v.select_example(&example).unwrap();
        assert_eq!(v.query(), "professional office outfit");
        assert_eq!(ticket.request.q, "professional office outfit");
    }

    #[test]
    fn resize_changes_page_size_only() {
        let mut v = view(160);
        let t = v.submit().unwrap();
        v.complete(t.id, Ok(response(json!({"results": [{"title": "a"}]}))));
        assert!(v.resize(70));
        assert_eq!(v.layout().top_k, 6);
        assert_eq!(v.results().len(), 1);
        assert!(!v.resize(70));
    }

    #[test]
    fn image_status_is_per_card_and_generation_checked() {
        let mut v = view(120);
        let t = v.submit().unwrap();
        v.complete(
            t.id,
            Ok(response(json!({"results": [
                {"raw": {"images": [{"thumb": "t1"}]}},
                {"raw": {"images": [{"large": "l2"}]}},
                {"title": "no image"}
            ]}))),
        );
        let generation = v.generation();
        assert_eq!(
            v.pending_images(),
            vec![(0, "t1".to_string()), (1, "l2".to_string())]
        );

        assert!(v.set_image_status(generation, 1, ImageStatus::Failed));
        assert!(!v.set_image_status(generation, 2, ImageStatus::Loaded));
        assert_eq!(v.cards()[0].image, ImageStatus::Pending);
        assert_eq!(v.cards()[1].image, ImageStatus::Failed);
        assert_eq!(v.cards()[2].image, ImageStatus::Absent);

        let t = v.submit().unwrap();
        v.complete(t.id, Ok(response(json!({"results": [{"raw": {"images": [{"thumb": "x"}]}}]}))));
        assert!(!v.set_image_status(generation, 0, ImageStatus::Loaded));
        assert_eq!(v.cards()[0].image, ImageStatus::Pending);
    }

    #[test]
    fn unchecked_images_leave_pending_state() {
        let mut v = view(120);
        let t = v.submit().unwrap();
        v.complete(
            t.id,
            Ok(response(json!({"results": [
                {"raw": {"images": [{"thumb": "t1"}]}},
                {"title": "no image"}
            ]}))),
        );
        assert_eq!(v.mark_images_unchecked(), 1);
        assert_eq!(v.cards()[0].image, ImageStatus::Unchecked);
        assert_eq!(v.cards()[1].image, ImageStatus::Absent);
        assert!(v.pending_images().is_empty());
    }

    #[test]
    fn image_search_sends_encoded_image_and_optional_query() {
        let mut v = view(60);
        v.set_query("   ");
        let ticket = v.submit_image("aGVsbG8=".to_string());
        assert_eq!(ticket.request.q, "");
        assert_eq!(ticket.request.image_base64.as_deref(), Some("aGVsbG8="));
        assert_eq!(ticket.request.top_k, 6);
        assert!(v.is_loading());

        v.set_query("red sneakers");
        let second = v.submit_image("aGVsbG8=".to_string());
        assert_eq!(second.request.q, "red sneakers");
        assert!(second.id > ticket.id);
    }
}
