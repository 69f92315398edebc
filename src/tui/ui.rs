use crate::api::GenderFilter;
use crate::card::ProductCard;
use crate::tui::app::{App, Focus};
use crate::tui::colors;
use crate::view::Notice;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const APP_NAME: &str = "\u{2728} StyleSense AI";
const TAGLINE: &str = "Discover fashion with AI-powered semantic intelligence";
const PLACEHOLDER: &str = "Describe what you're looking for... \u{2728}";
const SEARCH_ICON: &str = " \u{1F50D} ";

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let header_height = app.view.layout().header_height;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height), // Header
            Constraint::Length(3),             // Search bar
            Constraint::Length(1),             // Controls
            Constraint::Length(2),             // Examples
            Constraint::Min(3),                // Results grid
            Constraint::Length(1),             // Status bar
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);
    draw_search_bar(frame, app, chunks[1]);
    draw_controls(frame, app, chunks[2]);
    draw_examples(frame, app, chunks[3]);
    draw_grid(frame, app, chunks[4]);
    draw_status_bar(frame, app, chunks[5]);

    if app.detail_open {
        if let Some(card) = app.grid.selected.and_then(|i| app.view.cards().get(i)) {
            draw_detail(frame, card, area);
        }
    }

    if let Some(notice) = app.view.notice() {
        draw_notice(frame, notice, area);
        return;
    }

    if app.focus == Focus::Search && !app.detail_open {
        let search_area = chunks[1];
        let prefix = SEARCH_ICON.width() as u16;
        let column = u16::try_from(app.search.cursor_column(app.view.query())).unwrap_or(u16::MAX);
        let cursor_x = search_area
            .x
            .saturating_add(1 + prefix)
            .saturating_add(column)
            .min(search_area.right().saturating_sub(2));
        let cursor_y = search_area.y + 1;
        frame.set_cursor_position(Position::new(cursor_x, cursor_y));
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let title_style = Style::default().fg(colors::BRAND).add_modifier(Modifier::BOLD);
    let stats = stats_spans(app);

    if app.view.layout().is_narrow() {
        let mut spans = vec![Span::styled(APP_NAME, title_style)];
        if !stats.is_empty() {
            spans.push(Span::raw("  "));
            spans.extend(stats);
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    }

    let lines = vec![
        Line::from(Span::styled(APP_NAME, title_style)).centered(),
        Line::from(Span::styled(TAGLINE, Style::default().fg(colors::MUTED))).centered(),
        Line::from(stats).centered(),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

/// `N products found` and the search time, only once there are results
fn stats_spans(app: &App) -> Vec<Span<'static>> {
    let count = app.view.cards().len();
    if count == 0 {
        return Vec::new();
    }
    let mut spans = vec![Span::styled(
        format!("\u{1F4CA} {} products found", count),
        Style::default().fg(colors::BRAND),
    )];
    if let Some(ms) = app.view.search_time_ms().filter(|ms| *ms > 0) {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("\u{26A1} {}ms", ms),
            Style::default().fg(colors::PRICE),
        ));
    }
    spans
}

fn draw_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let border_style = if app.focus == Focus::Search {
        Style::default().fg(colors::BRAND)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Search ");

    let query = app.view.query();
    let line = if query.is_empty() {
        Line::from(vec![
            Span::raw(SEARCH_ICON),
            Span::styled(
                PLACEHOLDER,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ])
    } else {
        let style = if app.view.is_loading() {
            Style::default().fg(colors::MUTED)
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(vec![Span::raw(SEARCH_ICON), Span::styled(query.to_string(), style)])
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_controls(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(colors::SUBTLE);
    let toggle = if app.view.rerank() {
        Span::styled(
            " ON ",
            Style::default().fg(Color::White).bg(colors::BRAND_DEEP).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(" OFF ", Style::default().fg(Color::White).bg(colors::DISABLED))
    };

    let button = if app.view.is_loading() {
        Span::styled(
            "\u{23F3} Searching",
            Style::default().fg(colors::MUTED).add_modifier(Modifier::BOLD),
        )
    } else if app.view.can_submit() {
        Span::styled(
            "\u{1F680} Search [Enter]",
            Style::default().fg(Color::White).bg(colors::BRAND).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("\u{1F680} Search [Enter]", Style::default().fg(colors::DISABLED))
    };

    let line = Line::from(vec![
        Span::styled(" [Ctrl+R] ", key_style),
        Span::raw("AI re-rank "),
        toggle,
        Span::styled("   [Ctrl+G] ", key_style),
        Span::raw(format!("Gender: {}", GenderFilter::label(app.view.gender_filter()))),
        Span::raw("   "),
        button,
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_examples(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Examples;
    let mut spans = vec![Span::styled(" Try: ", Style::default().fg(colors::SUBTLE))];

    for (i, example) in app.view.examples().iter().enumerate() {
        let style = if focused && i == app.selected_example {
            Style::default().fg(Color::Black).bg(colors::BRAND).add_modifier(Modifier::BOLD)
        } else if app.view.is_loading() {
            Style::default().fg(colors::DISABLED)
        } else {
            Style::default().fg(colors::MUTED)
        };
        spans.push(Span::styled(
            format!(" {} {} {} ", i + 1, example.emoji, example.text),
            style,
        ));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_grid(frame: &mut Frame, app: &mut App, area: Rect) {
    let layout = *app.view.layout();
    let card_height = layout.card_height();
    app.grid.visible_rows = (area.height / card_height).max(1) as usize;
    app.grid.set_columns(layout.columns as usize);

    let cards = app.view.cards();
    if cards.is_empty() {
        draw_empty_state(frame, app.view.is_loading(), area);
        return;
    }

    let columns = layout.columns.max(1) as usize;
    let card_width = layout.card_width(area.width);
    let start = app.grid.scroll_row * columns;
    let end = (start + app.grid.visible_rows * columns).min(cards.len());

    for (slot, index) in (start..end).enumerate() {
        let row = (slot / columns) as u16;
        let col = (slot % columns) as u16;
        let rect = Rect::new(
            area.x + col * (card_width + layout.gap),
            area.y + row * card_height,
            card_width,
            card_height,
        )
        .intersection(area);
        if rect.is_empty() {
            continue;
        }
        let selected = app.focus == Focus::Results && app.grid.selected == Some(index);
        draw_card(frame, &cards[index], index, selected, layout.show_description, rect);
    }
}

fn draw_empty_state(frame: &mut Frame, loading: bool, area: Rect) {
    let lines = if loading {
        vec![Line::from(Span::styled(
            "\u{23F3} Searching...",
            Style::default().fg(colors::MUTED),
        ))
        .centered()]
    } else {
        vec![
            Line::from("\u{1F3AF}").centered(),
            Line::from(Span::styled(
                "Ready to Discover Amazing Fashion?",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ))
            .centered(),
            Line::from(Span::styled(
                "Describe what you're looking for or try one of the examples above",
                Style::default().fg(colors::MUTED),
            ))
            .centered(),
        ]
    };

    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let inner = Rect::new(area.x, area.y + top, area.width, area.height.saturating_sub(top));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_card(
    frame: &mut Frame,
    card: &ProductCard,
    index: usize,
    selected: bool,
    show_description: bool,
    area: Rect,
) {
    let border_style = if selected {
        Style::default().fg(colors::BRAND).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::SUBTLE)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ", index + 1));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let mut lines = Vec::with_capacity(5);

    lines.push(Line::from(Span::styled(
        fit(&card.title, width),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )));

    let mut meta = Vec::new();
    if let Some(price) = &card.price {
        meta.push(Span::styled(
            price.clone(),
            Style::default().fg(colors::PRICE).add_modifier(Modifier::BOLD),
        ));
    }
    if let Some(rating) = &card.rating {
        if !meta.is_empty() {
            meta.push(Span::raw("  "));
        }
        meta.push(Span::styled(
            format!("\u{2B50} {}", rating),
            Style::default().fg(colors::RATING),
        ));
    }
    lines.push(Line::from(meta));

    match (&card.match_badge, card.score) {
        (Some(badge), Some(score)) => lines.push(Line::from(Span::styled(
            fit(&format!("\u{1F3AF} {}", badge), width),
            Style::default().fg(colors::color_for_score(score)),
        ))),
        _ => lines.push(Line::default()),
    }

    if show_description {
        let text = card.description.as_deref().unwrap_or_default();
        lines.push(Line::from(Span::styled(
            fit(text, width),
            Style::default().fg(colors::MUTED).add_modifier(Modifier::ITALIC),
        )));
    }

    if let Some((label, color)) = colors::image_label(card.image) {
        lines.push(Line::from(Span::styled(label, Style::default().fg(color))));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if app.view.is_loading() {
        format!(" \u{23F3} {}...", app.status_message)
    } else {
        let last = app
            .view
            .last_search_at()
            .map(|t| format!(" | last search {}", t.format("%H:%M:%S")))
            .unwrap_or_default();
        format!(" {}{}", app.status_message, last)
    };

    let right_text = match app.focus {
        Focus::Results => " \u{2190}\u{2191}\u{2192}\u{2193}:Move  Enter:Details  o:Open image  y:Copy  Tab:Focus  Ctrl+Q:Quit ",
        Focus::Examples => " \u{2190}\u{2192}:Choose  Enter:Search  Alt+1-9:Example  Tab:Focus  Ctrl+Q:Quit ",
        Focus::Search => " Enter:Search  Alt+1-9:Example  Tab:Focus  Esc:Clear  Ctrl+Q:Quit ",
    };

    // Build the status line: left-aligned text + padding + right-aligned text
    let available_width = area.width as usize;
    let left_len = left_text.width();
    let right_len = right_text.width();

    let status_str = if left_len + right_len < available_width {
        let padding = available_width - left_len - right_len;
        format!("{}{:padding$}{}", left_text, "", right_text, padding = padding)
    } else {
        fit(&left_text, available_width)
    };

    let status = Paragraph::new(status_str)
        .style(Style::default().fg(Color::White).bg(colors::STATUS_BG));

    frame.render_widget(status, area);
}

/// Helper to create a centered popup area
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn draw_notice(frame: &mut Frame, notice: &Notice, area: Rect) {
    let width = (notice.message.width() as u16 + 4).clamp(30, 70).min(area.width);
    let text_width = width.saturating_sub(4).max(1);
    let text_lines = (notice.message.width() as u16).div_ceil(text_width).max(1);
    let popup_area = centered_rect(width, text_lines + 4, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(format!(" {} ", notice.title))
        .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let lines = vec![
        Line::from(Span::styled(notice.message.as_str(), Style::default().fg(Color::White))),
        Line::default(),
        Line::from(Span::styled(
            " [ OK ] ",
            Style::default().fg(Color::Black).bg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .centered(),
    ];
    let text_area = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), text_area);
}

fn draw_detail(frame: &mut Frame, card: &ProductCard, area: Rect) {
    let label = Style::default().fg(colors::SUBTLE);
    let value = Style::default().fg(Color::White);
    let field = |name: &'static str, text: String| {
        Line::from(vec![Span::styled(format!("{:<13}", name), label), Span::styled(text, value)])
    };

    let mut lines = vec![Line::from(Span::styled(
        card.title.clone(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::default());
    if let Some(price) = &card.price {
        lines.push(field("Price", price.clone()));
    }
    if let Some(rating) = &card.rating {
        lines.push(field("Rating", format!("\u{2B50} {}", rating)));
    }
    if let Some(badge) = &card.match_badge {
        lines.push(field("Match", badge.clone()));
    }
    if let Some(rank) = card.rank {
        lines.push(field("Rank", rank.to_string()));
    }
    if let Some(score) = card.rerank_score {
        lines.push(field("Re-rank score", format!("{:.3}", score)));
    }
    if let Some(url) = &card.image_url {
        lines.push(field("Image", url.clone()));
    }
    if let Some(description) = &card.description {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(description.clone(), value)));
    }
    if let Some(explanation) = &card.explanation {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            explanation.clone(),
            Style::default().fg(colors::BRAND).add_modifier(Modifier::ITALIC),
        )));
    }

    let width = 72.min(area.width.saturating_sub(4));
    let height = (lines.len() as u16 + 6).min(area.height.saturating_sub(2));
    let popup_area = centered_rect(width, height, area);

    frame.render_widget(Clear, popup_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::BRAND))
        .title(" Product ")
        .title_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(colors::PANEL_BG));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);
    let text_area = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), text_area);
}

/// Truncate to `width` display columns, marking the cut with an ellipsis
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('\u{2026}');
    out
}
