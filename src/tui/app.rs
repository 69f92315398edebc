use crate::api::Recommender;
use crate::config::AppConfig;
use crate::tui::grid::GridState;
use crate::tui::search::SearchState;
use crate::tui::ui;
use crate::tui::worker::{self, BgMessage};
use crate::view::{Completion, SearchTicket, SearchView};
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which part of the screen receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Examples,
    Results,
}

pub struct App {
    pub view: SearchView,

    // Sub-states
    pub search: SearchState,
    pub grid: GridState,
    pub focus: Focus,
    pub selected_example: usize,
    pub detail_open: bool,
    pub status_message: String,

    recommender: Arc<dyn Recommender>,
    probe_images: bool,

    // Channel
    bg_sender: Sender<BgMessage>,
    bg_receiver: Receiver<BgMessage>,

    // Quit flag
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &AppConfig, recommender: Arc<dyn Recommender>, width: u16) -> Self {
        let (bg_sender, bg_receiver) = unbounded();
        let view = SearchView::new(config, width);
        let mut search = SearchState::default();
        search.move_to_end(view.query());

        let mut grid = GridState::default();
        grid.set_columns(view.layout().columns as usize);

        Self {
            view,
            search,
            grid,
            focus: Focus::Search,
            selected_example: 0,
            detail_open: false,
            status_message: "Ready".to_string(),
            recommender,
            probe_images: config.probe_images,
            bg_sender,
            bg_receiver,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> crate::Result<()> {
        let tick_rate = Duration::from_millis(50);
        let mut last_tick = Instant::now();

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                self.handle_event(event::read()?);
            }

            if last_tick.elapsed() >= tick_rate {
                self.process_messages();
                last_tick = Instant::now();
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Resize(width, _) => self.handle_resize(width),
            _ => {}
        }
    }

    pub fn handle_resize(&mut self, width: u16) {
        if self.view.resize(width) {
            let layout = self.view.layout();
            tracing::debug!(
                target: "tui",
                width,
                columns = layout.columns,
                top_k = layout.top_k,
                "layout changed"
            );
            self.grid.set_columns(layout.columns as usize);
        }
    }

    // --- Search lifecycle ---

    /// Submit the current query. Does nothing while the submit control is disabled.
    pub fn submit(&mut self) {
        if !self.view.can_submit() {
            return;
        }
        if let Some(ticket) = self.view.submit() {
            self.dispatch(ticket);
        }
    }

    /// Run the example at `index`. Disabled while a search is loading.
    pub fn select_example(&mut self, index: usize) {
        if self.view.is_loading() {
            return;
        }
        let Some(example) = self.view.examples().get(index).cloned() else {
            return;
        };
        self.selected_example = index;
        if let Some(ticket) = self.view.select_example(&example) {
            self.search.move_to_end(self.view.query());
            self.dispatch(ticket);
        }
    }

    fn dispatch(&mut self, ticket: SearchTicket) {
        self.status_message = format!("Searching for '{}'", ticket.request.q);
        worker::spawn_search(Arc::clone(&self.recommender), ticket, self.bg_sender.clone());
    }

    pub fn process_messages(&mut self) {
        while let Ok(msg) = self.bg_receiver.try_recv() {
            match msg {
                BgMessage::SearchComplete { id, outcome } => match self.view.complete(id, outcome) {
                    Completion::Replaced => {
                        let total = self.view.cards().len();
                        self.grid.reset(total);
                        self.detail_open = false;
                        self.status_message = format!("{} products found", total);
                        self.start_image_probes();
                    }
                    Completion::Failed => {
                        self.status_message = "Search failed".to_string();
                    }
                    Completion::Stale => {}
                },
                BgMessage::ImageProbed {
                    generation,
                    index,
                    status,
                } => {
                    self.view.set_image_status(generation, index, status);
                }
            }
        }
    }

    fn start_image_probes(&mut self) {
        if !self.probe_images {
            self.view.mark_images_unchecked();
            return;
        }
        let pending = self.view.pending_images();
        if pending.is_empty() {
            return;
        }
        worker::spawn_image_probes(
            Arc::clone(&self.recommender),
            self.view.generation(),
            pending,
            self.bg_sender.clone(),
        );
    }

    // --- Card actions ---

    fn selected_card(&self) -> Option<&crate::card::ProductCard> {
        self.grid.selected.and_then(|i| self.view.cards().get(i))
    }

    fn open_selected_image(&mut self) {
        let Some(url) = self.selected_card().and_then(|c| c.image_url.clone()) else {
            self.status_message = "No image for this product".to_string();
            return;
        };
        self.status_message = match open::that(&url) {
            Ok(()) => format!("Opened {}", url),
            Err(e) => {
                tracing::warn!(target: "tui", url = %url, error = %e, "could not open image");
                format!("Could not open image: {}", e)
            }
        };
    }

    fn copy_selected(&mut self) {
        let Some(card) = self.selected_card() else {
            return;
        };
        let text = match &card.image_url {
            Some(url) => format!("{}\n{}", card.title, url),
            None => card.title.clone(),
        };
        self.status_message = match copy_to_clipboard(&text) {
            Ok(()) => "Copied to clipboard".to_string(),
            Err(e) => e.to_string(),
        };
    }

    // --- Key handling ---

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Global keys
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.should_quit = true;
                return;
            }
            _ => {}
        }

        // An error notice blocks everything until dismissed
        if self.view.notice().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.view.dismiss_notice();
            }
            return;
        }

        if self.detail_open {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.detail_open = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let on = self.view.toggle_rerank();
                self.status_message = format!("AI re-rank {}", if on { "on" } else { "off" });
                return;
            }
            KeyCode::Char('g') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let filter = self.view.cycle_gender_filter();
                self.status_message =
                    format!("Gender filter: {}", crate::api::GenderFilter::label(filter));
                return;
            }
            KeyCode::Char(c @ '1'..='9') if key.modifiers.contains(KeyModifiers::ALT) => {
                self.select_example(c as usize - '1' as usize);
                return;
            }
            KeyCode::F(5) => {
                self.submit();
                return;
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Search => Focus::Examples,
                    Focus::Examples if !self.view.cards().is_empty() => Focus::Results,
                    Focus::Examples | Focus::Results => Focus::Search,
                };
                self.search.focused = self.focus == Focus::Search;
                return;
            }
            KeyCode::Esc => {
                self.handle_escape();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Search => self.handle_search_key(key),
            Focus::Examples => self.handle_examples_key(key),
            Focus::Results => self.handle_results_key(key),
        }
    }

    fn handle_escape(&mut self) {
        match self.focus {
            Focus::Search => {
                if !self.search.clear(self.view.query_mut()) {
                    self.should_quit = true;
                }
            }
            Focus::Examples | Focus::Results => self.focus_search(),
        }
    }

    fn focus_search(&mut self) {
        self.focus = Focus::Search;
        self.search.focused = true;
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Down => {
                self.focus = Focus::Examples;
                self.search.focused = false;
            }
            code => {
                if !self.view.is_loading() {
                    self.search.apply_key(self.view.query_mut(), code);
                }
            }
        }
    }

    fn handle_examples_key(&mut self, key: KeyEvent) {
        let count = self.view.examples().len();
        match key.code {
            KeyCode::Left => self.selected_example = self.selected_example.saturating_sub(1),
            KeyCode::Right if count > 0 => {
                self.selected_example = (self.selected_example + 1).min(count - 1)
            }
            KeyCode::Enter => self.select_example(self.selected_example),
            KeyCode::Up => self.focus_search(),
            KeyCode::Down if !self.view.cards().is_empty() => self.focus = Focus::Results,
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        let total = self.view.cards().len();
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.grid.select_prev(total),
            KeyCode::Right | KeyCode::Char('l') => self.grid.select_next(total),
            KeyCode::Down | KeyCode::Char('j') => self.grid.select_down(total),
            KeyCode::Up | KeyCode::Char('k') => {
                if self.grid.on_first_row() {
                    self.focus = Focus::Examples;
                } else {
                    self.grid.select_up(total);
                }
            }
            KeyCode::PageDown => self.grid.page_down(total),
            KeyCode::PageUp => self.grid.page_up(total),
            KeyCode::Home => self.grid.select_first(total),
            KeyCode::End => self.grid.select_last(total),
            KeyCode::Enter if self.grid.selected.is_some() => self.detail_open = true,
            KeyCode::Char('o') => self.open_selected_image(),
            KeyCode::Char('y') => self.copy_selected(),
            KeyCode::Char('/') => self.focus_search(),

            // Any other printable char focuses search and types it
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.focus_search();
                if !self.view.is_loading() {
                    let query = self.view.query_mut();
                    query.push(c);
                    let len = query.len();
                    self.search.cursor_pos = len;
                }
            }
            _ => {}
        }
    }
}

fn copy_to_clipboard(text: &str) -> crate::Result<()> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::testing::FakeRecommender;
    use crossterm::event::KeyEventState;
    use std::thread;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn with_mods(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            modifiers,
            ..key(code)
        }
    }

    fn app(fake: Arc<FakeRecommender>, width: u16) -> App {
        App::new(&AppConfig::default(), fake, width)
    }

    /// Pump messages until the view is idle and every image probe has reported
    fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            app.process_messages();
            let images_pending = app
                .view
                .cards()
                .iter()
                .any(|c| c.image == crate::card::ImageStatus::Pending);
            if !app.view.is_loading() && !images_pending {
                return;
            }
            assert!(Instant::now() < deadline, "background work did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn enter_submits_once_with_current_state() {
        let fake = Arc::new(FakeRecommender::with_titles(&["a", "b"]));
        let mut app = app(fake.clone(), 160);
        app.handle_key(with_mods(KeyCode::Char('r'), KeyModifiers::CONTROL));
        app.handle_key(key(KeyCode::Enter));
        settle(&mut app);

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].q, "outfit for tropical vacation");
        assert!(requests[0].rerank);
        assert_eq!(requests[0].top_k, 12);
        assert_eq!(app.view.cards().len(), 2);
        assert_eq!(app.grid.selected, Some(0));
    }

    #[test]
    fn enter_is_ignored_while_loading() {
        let fake = Arc::new(FakeRecommender::with_titles(&["a"]));
        let mut app = app(fake.clone(), 160);
        app.submit();
        assert!(app.view.is_loading());
        app.handle_key(key(KeyCode::Enter));
        settle(&mut app);
        assert_eq!(fake.requests().len(), 1);
    }

    #[test]
    fn empty_query_sends_nothing() {
        let fake = Arc::new(FakeRecommender::with_titles(&["a"]));
        let mut app = app(fake.clone(), 160);
        app.handle_key(key(KeyCode::Esc));
        assert!(app.view.query().is_empty());
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Enter));
        settle(&mut app);
        assert!(fake.requests().is_empty());
        assert!(!app.should_quit);
    }

    #[test]
    fn example_shortcut_searches_example_text() {
        let fake = Arc::new(FakeRecommender::with_titles(&["x"]));
        let mut app = app(fake.clone(), 80);
        app.handle_key(with_mods(KeyCode::Char('4'), KeyModifiers::ALT));
        assert_eq!(app.view.query(), "winter coat for extreme cold");
        settle(&mut app);
        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].q, "winter coat for extreme cold");
        assert_eq!(requests[0].top_k, 6);
    }

    #[test]
    fn failure_shows_blocking_notice_and_keeps_results() {
        let fake = Arc::new(FakeRecommender::with_titles(&["kept"]));
        let mut app = app(fake.clone(), 160);
        app.submit();
        settle(&mut app);

        fake.fail_next("connection refused");
        app.submit();
        settle(&mut app);

        assert_eq!(app.view.cards().len(), 1);
        assert!(app.view.notice().is_some());

        // Keys other than dismiss are swallowed by the notice
        app.handle_key(key(KeyCode::Char('z')));
        assert_eq!(app.view.query(), "outfit for tropical vacation");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.view.notice().is_none());
        assert_eq!(fake.requests().len(), 2);
    }

    #[test]
    fn image_probes_update_only_their_card() {
        let fake = Arc::new(FakeRecommender::with_products(serde_json::json!([
            {"title": "ok", "raw": {"images": [{"large": "http://img/ok.jpg"}]}},
            {"title": "broken", "raw": {"images": [{"thumb": "http://img/broken.jpg"}]}},
            {"title": "none"}
        ])));
        fake.fail_image("http://img/broken.jpg");
        let mut app = app(fake.clone(), 160);
        app.submit();
        settle(&mut app);

        use crate::card::ImageStatus;
        let statuses: Vec<_> = app.view.cards().iter().map(|c| c.image).collect();
        assert_eq!(
            statuses,
            vec![ImageStatus::Loaded, ImageStatus::Failed, ImageStatus::Absent]
        );
        assert_eq!(app.view.cards().len(), 3);
    }

    #[test]
    fn disabled_probes_settle_image_status() {
        let fake = Arc::new(FakeRecommender::with_products(serde_json::json!([
            {"title": "shirt", "raw": {"images": [{"large": "http://img/shirt.jpg"}]}}
        ])));
        let config = AppConfig {
            probe_images: false,
            ..AppConfig::default()
        };
        let mut app = App::new(&config, fake, 160);
        app.submit();
        settle(&mut app);

        assert_eq!(app.view.cards()[0].image, crate::card::ImageStatus::Unchecked);
        assert_eq!(
            app.view.cards()[0].image_url.as_deref(),
            Some("http://img/shirt.jpg")
        );
    }

    #[test]
    fn resize_updates_grid_columns() {
        let fake = Arc::new(FakeRecommender::with_titles(&[]));
        let mut app = app(fake, 160);
        assert_eq!(app.grid.columns, 4);
        app.handle_event(Event::Resize(70, 30));
        assert_eq!(app.grid.columns, 1);
        assert_eq!(app.view.layout().top_k, 6);
    }

    #[test]
    fn tab_cycles_focus_and_typing_returns_to_search() {
        let fake = Arc::new(FakeRecommender::with_titles(&["a", "b", "c"]));
        let mut app = app(fake, 160);
        app.submit();
        settle(&mut app);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Examples);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Results);
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.grid.selected, Some(1));

        app.handle_key(key(KeyCode::Char('!')));
        assert_eq!(app.focus, Focus::Search);
        assert!(app.view.query().ends_with('!'));
    }

    #[test]
    fn escape_on_empty_search_quits() {
        let fake = Arc::new(FakeRecommender::with_titles(&[]));
        let mut app = app(fake, 160);
        app.handle_key(key(KeyCode::Esc));
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }
}
