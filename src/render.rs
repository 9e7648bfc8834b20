//! Terminal rendering of the game view, plus the notice modal.
//!
//! This is the presentation adapter: it keeps the last view and notice the
//! session handed over and draws them on every frame.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::actions::Intent;
use crate::click::ClickMap;
use crate::presenter::Presenter;
use crate::state::GameStateView;

/// What is on screen between frames.
#[derive(Default)]
pub struct Screen {
    pub view: Option<GameStateView>,
    pub notice: Option<String>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn has_notice(&self) -> bool {
        self.notice.is_some()
    }
}

/// Presenter that writes into a shared [`Screen`].
pub struct ScreenPresenter {
    screen: Rc<RefCell<Screen>>,
}

impl ScreenPresenter {
    pub fn new(screen: Rc<RefCell<Screen>>) -> Self {
        Self { screen }
    }
}

impl Presenter for ScreenPresenter {
    fn render(&mut self, view: &GameStateView) {
        self.screen.borrow_mut().view = Some(view.clone());
    }

    fn notify(&mut self, message: &str) {
        self.screen.borrow_mut().notice = Some(message.to_string());
    }
}

/// Narrow screens drop the per-book resource names.
const NARROW_WIDTH: u16 = 60;

pub fn render(screen: &Screen, f: &mut Frame, area: Rect, cs: &mut ClickMap) {
    let Some(view) = &screen.view else {
        f.render_widget(Paragraph::new("Loading...").alignment(Alignment::Center), area);
        return;
    };

    // The modal sits on top, so its rows must win hit-testing.
    let modal = screen.notice.as_ref().map(|_| modal_rect(area));
    if let Some(rect) = modal {
        cs.cover(rect, Intent::DismissNotice);
    }

    let narrow = area.width < NARROW_WIDTH;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Min(3),
        ])
        .split(area);

    render_header(view, f, chunks[0]);
    render_read(view, narrow, f, chunks[1], cs);
    render_convert(view, f, chunks[2], cs);
    render_upgrades(view, narrow, f, chunks[3], cs);
    render_help(f, chunks[4]);

    if let (Some(rect), Some(notice)) = (modal, &screen.notice) {
        render_notice(notice, f, rect);
    }
}

fn button_style(enabled: bool) -> Style {
    if enabled {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn text_style(enabled: bool) -> Style {
    if enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_header(view: &GameStateView, f: &mut Frame, area: Rect) {
    let clicks_color = if view.clicks == 0 {
        Color::Red
    } else {
        Color::Green
    };
    let line = Line::from(vec![
        Span::styled("Clicks ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}/{}", view.clicks, view.max_clicks),
            Style::default().fg(clicks_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled("372 Pages ", Style::default().fg(Color::Gray)),
        Span::styled(
            format_count(view.currency),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    let header = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" 372 Pages "),
        );
    f.render_widget(header, area);
}

fn render_read(view: &GameStateView, narrow: bool, f: &mut Frame, area: Rect, cs: &mut ClickMap) {
    let items: Vec<ListItem> = view
        .books
        .iter()
        .map(|book| {
            let intent = Intent::Read(book.kind);
            let amount = if narrow {
                format_count(book.resource)
            } else {
                format!("{}: {}", book.kind.resource_name(), format_count(book.resource))
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", intent.key_label()), button_style(book.can_read)),
                Span::styled(format!("{:<17}", book.kind.title()), text_style(book.can_read)),
                Span::styled(amount, Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let widget = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Read (1 click) "),
    );
    f.render_widget(widget, area);

    cs.list_rows(area, view.books.iter().map(|book| Intent::Read(book.kind)));
}

fn render_convert(view: &GameStateView, f: &mut Frame, area: Rect, cs: &mut ClickMap) {
    let items: Vec<ListItem> = view
        .books
        .iter()
        .map(|book| {
            let intent = Intent::Convert(book.kind);
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", intent.key_label()), button_style(book.can_convert)),
                Span::styled(format!("{:<17}", book.kind.title()), text_style(book.can_convert)),
                Span::styled(
                    format!(
                        "{} → {} Pages",
                        format_count(book.conversion_cost),
                        format_count(book.conversion_output)
                    ),
                    text_style(book.can_convert),
                ),
            ]))
        })
        .collect();

    let widget = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(" Convert "),
    );
    f.render_widget(widget, area);

    cs.list_rows(area, view.books.iter().map(|book| Intent::Convert(book.kind)));
}

fn render_upgrades(
    view: &GameStateView,
    narrow: bool,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickMap,
) {
    let items: Vec<ListItem> = view
        .upgrades
        .iter()
        .map(|upgrade| {
            let intent = Intent::BuyUpgrade(upgrade.kind);
            let mut spans = vec![
                Span::styled(format!(" {} ", intent.key_label()), button_style(upgrade.affordable)),
                Span::styled(format!("{:<17}", upgrade.kind.title()), text_style(upgrade.affordable)),
                Span::styled(
                    format!("Lv{:<3} ", upgrade.level),
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled(
                    format!("{} Pages", format_count(upgrade.cost)),
                    text_style(upgrade.affordable),
                ),
            ];
            if !narrow {
                let effect = if upgrade.passive { " passive" } else { " +click" };
                spans.push(Span::styled(effect, Style::default().fg(Color::DarkGray)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let widget = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" Upgrades "),
    );
    f.render_widget(widget, area);

    cs.list_rows(
        area,
        view.upgrades
            .iter()
            .map(|upgrade| Intent::BuyUpgrade(upgrade.kind)),
    );
}

fn render_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(Line::from(Span::styled(
        "1-4 read · Q-R convert · A-F upgrade · tap a row",
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(help, area);
}

fn render_notice(notice: &str, f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(notice, Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / Esc to close", Intent::DismissNotice.key_label()),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Notice "),
        );
    f.render_widget(Clear, area);
    f.render_widget(widget, area);
}

/// Centered box for the notice, clipped to the frame.
fn modal_rect(area: Rect) -> Rect {
    let width = area.width.saturating_sub(4).min(56);
    let height = area.height.min(7);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Group digits by thousands: 1234567 → "1,234,567".
pub fn format_count(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
