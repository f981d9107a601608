use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs};
use ratatui::{Frame, Terminal};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::api::Post;
use crate::data::PostService;
use crate::feed::{self, ALL_CATEGORY};
use crate::fetch::{self, FetchHandle, FetchState};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const CARD_WIDTH: u16 = 30;

#[derive(Clone)]
pub struct Options {
    pub status_message: String,
    pub categories: Vec<String>,
    pub service: Option<Arc<dyn PostService>>,
    pub config_path: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pane {
    Recommended,
    Categories,
    Feed,
}

#[derive(Debug, Clone, PartialEq)]
enum Screen {
    Home,
    Details(Post),
}

struct Spinner {
    index: usize,
    last_tick: Instant,
}

impl Spinner {
    fn new() -> Self {
        Self {
            index: 0,
            last_tick: Instant::now(),
        }
    }

    fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.index % SPINNER_FRAMES.len()]
    }

    fn advance(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_tick) >= Duration::from_millis(120) {
            self.index = (self.index + 1) % SPINNER_FRAMES.len();
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.index = 0;
        self.last_tick = Instant::now();
    }
}

pub struct Model {
    status_message: String,
    categories: Vec<String>,
    selected_category: usize,
    service: Option<Arc<dyn PostService>>,
    fetch: Option<FetchHandle>,
    filtered: Option<Vec<Post>>,
    selected_recommended: usize,
    selected_post: usize,
    focused_pane: Pane,
    screen: Screen,
    filter_modal_visible: bool,
    spinner: Spinner,
    needs_redraw: bool,
    config_path: String,
}

impl Model {
    pub fn new(options: Options) -> Self {
        let categories = if options.categories.is_empty() {
            feed::default_categories()
        } else {
            options.categories
        };

        let fetch = options
            .service
            .as_ref()
            .map(|service| fetch::activate(service.clone()));
        let status_message = if fetch.is_some() {
            "Loading posts…".to_string()
        } else {
            options.status_message
        };

        Model {
            status_message,
            categories,
            selected_category: 0,
            service: options.service,
            fetch,
            filtered: None,
            selected_recommended: 0,
            selected_post: 0,
            focused_pane: Pane::Feed,
            screen: Screen::Home,
            filter_modal_visible: false,
            spinner: Spinner::new(),
            needs_redraw: true,
            config_path: options.config_path,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        let tick_rate = Duration::from_millis(120);

        loop {
            if self.poll_fetch() {
                self.mark_dirty();
            }

            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(16));

            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        match self.handle_key(key.code) {
                            Ok(true) => break,
                            Ok(false) => {}
                            Err(err) => {
                                self.status_message = format!("Error: {}", err);
                                self.mark_dirty();
                            }
                        }
                    }
                }
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
                if self.is_loading() && self.spinner.advance() {
                    self.mark_dirty();
                } else if !self.is_loading() {
                    self.spinner.reset();
                }
            }
        }

        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    fn is_loading(&self) -> bool {
        self.fetch
            .as_ref()
            .map(|handle| handle.state().is_loading())
            .unwrap_or(false)
    }

    fn data(&self) -> Option<&[Post]> {
        self.fetch.as_ref().and_then(|handle| handle.state().data())
    }

    fn fetch_error(&self) -> Option<&crate::api::FetchError> {
        self.fetch.as_ref().and_then(|handle| handle.state().error())
    }

    fn selected_category_name(&self) -> &str {
        self.categories
            .get(self.selected_category)
            .map(String::as_str)
            .unwrap_or(ALL_CATEGORY)
    }

    /// Drains the fetch channel. On the single settle transition the derived
    /// view is recomputed and the status line updated.
    fn poll_fetch(&mut self) -> bool {
        let Some(handle) = self.fetch.as_mut() else {
            return false;
        };
        if !handle.poll() {
            return false;
        }
        let message = match handle.state() {
            FetchState::Success(posts) => format!(
                "Loaded {} posts. j/k to browse, Enter to open, f to filter, r to refresh, q to quit.",
                posts.len()
            ),
            FetchState::Failure(err) => format!("Error: {}", err),
            FetchState::Loading => String::new(),
        };
        self.status_message = message;
        self.refresh_filtered();
        true
    }

    /// Recomputes the derived feed view. Called whenever either operand
    /// changes (fetch settles, category selection, refresh), so a stale
    /// derivation is never displayed.
    fn refresh_filtered(&mut self) {
        let category = self.selected_category_name().to_string();
        self.filtered = feed::filter_posts(self.data(), &category);

        let feed_len = self.filtered.as_ref().map_or(0, Vec::len);
        self.selected_post = self.selected_post.min(feed_len.saturating_sub(1));
        let total = self.data().map_or(0, <[Post]>::len);
        self.selected_recommended = self.selected_recommended.min(total.saturating_sub(1));
    }

    /// Discards the old handle and starts a fresh activation; the settled
    /// state machine is never transitioned out of.
    fn reload_posts(&mut self) {
        let Some(service) = self.service.clone() else {
            self.status_message = "No post service configured.".to_string();
            return;
        };
        self.fetch = Some(fetch::activate(service));
        self.filtered = None;
        self.status_message = "Loading posts…".to_string();
        self.spinner.reset();
    }

    fn select_category(&mut self, index: usize) {
        if index >= self.categories.len() {
            return;
        }
        self.selected_category = index;
        self.refresh_filtered();
        let shown = self.filtered.as_ref().map_or(0, Vec::len);
        if self.data().is_some() {
            self.status_message = format!(
                "Category {}: {} posts.",
                self.selected_category_name(),
                shown
            );
        }
    }

    fn open_selected_post(&mut self) {
        // Forwards the exact Post value the focused list rendered; no
        // re-fetch, no re-derivation.
        let post = match self.focused_pane {
            Pane::Recommended => self
                .data()
                .and_then(|posts| posts.get(self.selected_recommended))
                .cloned(),
            Pane::Feed => self
                .filtered
                .as_ref()
                .and_then(|posts| posts.get(self.selected_post))
                .cloned(),
            Pane::Categories => None,
        };
        if let Some(post) = post {
            self.screen = Screen::Details(post);
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if self.filter_modal_visible {
            return self.handle_modal_key(code);
        }
        if matches!(self.screen, Screen::Details(_)) {
            return self.handle_details_key(code);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.reload_posts();
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                self.filter_modal_visible = true;
            }
            KeyCode::Tab => {
                self.focused_pane = match self.focused_pane {
                    Pane::Recommended => Pane::Categories,
                    Pane::Categories => Pane::Feed,
                    Pane::Feed => Pane::Recommended,
                };
            }
            KeyCode::BackTab => {
                self.focused_pane = match self.focused_pane {
                    Pane::Recommended => Pane::Feed,
                    Pane::Categories => Pane::Recommended,
                    Pane::Feed => Pane::Categories,
                };
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_horizontal(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_horizontal(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_vertical(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_vertical(1),
            KeyCode::Enter => match self.focused_pane {
                Pane::Categories => self.select_category(self.selected_category),
                _ => self.open_selected_post(),
            },
            _ => {}
        }
        self.mark_dirty();
        Ok(false)
    }

    fn handle_details_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                self.screen = Screen::Home;
            }
            _ => {}
        }
        self.mark_dirty();
        Ok(false)
    }

    // The filter sheet is a stub: Date/Author/Tags entries carry no logic,
    // Back and Done only dismiss it.
    fn handle_modal_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('b') | KeyCode::Char('d') => {
                self.filter_modal_visible = false;
            }
            _ => {}
        }
        self.mark_dirty();
        Ok(false)
    }

    fn move_horizontal(&mut self, delta: i64) {
        match self.focused_pane {
            Pane::Recommended => {
                let total = self.data().map_or(0, <[Post]>::len);
                self.selected_recommended = step(self.selected_recommended, delta, total);
            }
            Pane::Categories => {
                let total = self.categories.len();
                let next = step(self.selected_category, delta, total);
                self.select_category(next);
            }
            Pane::Feed => {}
        }
    }

    fn move_vertical(&mut self, delta: i64) {
        if self.focused_pane == Pane::Feed {
            let total = self.filtered.as_ref().map_or(0, Vec::len);
            self.selected_post = step(self.selected_post, delta, total);
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        match &self.screen {
            Screen::Details(post) => {
                self.draw_details(frame, post);
            }
            Screen::Home => {
                self.draw_home(frame);
                if self.filter_modal_visible {
                    self.draw_filter_modal(frame);
                }
            }
        }
    }

    fn draw_home(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(8),
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Length(1),
            ])
            .split(frame.size());

        self.draw_header(frame, chunks[0]);
        self.draw_recommended(frame, chunks[1]);
        self.draw_categories(frame, chunks[2]);
        self.draw_feed(frame, chunks[3]);
        self.draw_status(frame, chunks[4]);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(" Search…", Style::default().fg(Color::DarkGray)),
            Span::raw("   "),
            Span::styled("[f]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Filter   "),
            Span::styled("[r]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Refresh   "),
            Span::styled("[q]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Quit"),
        ]);
        let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn draw_recommended(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focused_pane == Pane::Recommended;
        let block = pane_block("Recommended", focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.is_loading() {
            frame.render_widget(self.loading_line(), inner);
            return;
        }
        if let Some(err) = self.fetch_error() {
            frame.render_widget(error_line(err), inner);
            return;
        }
        let Some(posts) = self.data() else {
            return;
        };
        if posts.is_empty() {
            frame.render_widget(Paragraph::new("No posts."), inner);
            return;
        }

        // The carousel always shows the unfiltered collection; the category
        // selection only narrows the feed below.
        let visible = (inner.width / CARD_WIDTH).max(1) as usize;
        let start = self
            .selected_recommended
            .saturating_sub(visible.saturating_sub(1));
        let cards: Vec<Constraint> = (0..visible.min(posts.len() - start))
            .map(|_| Constraint::Length(CARD_WIDTH))
            .collect();
        let slots = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(cards)
            .split(inner);

        for (slot, (offset, post)) in slots.iter().zip(posts.iter().enumerate().skip(start)) {
            let selected = focused && offset == self.selected_recommended;
            let style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let width = slot.width.saturating_sub(2) as usize;
            let lines = vec![
                Line::from(Span::styled(
                    truncate_to_width(&post.title, width),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    truncate_to_width(&format!("[image: {}]", thumbnail_label(post)), width),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(Span::raw(format!("User ID: {}", post.user_id))),
                Line::from(Span::raw(format!("Views: {}", post.view_count()))),
            ];
            let card = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).border_style(style));
            frame.render_widget(card, *slot);
        }
    }

    fn draw_categories(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focused_pane == Pane::Categories;
        let titles: Vec<Line> = self
            .categories
            .iter()
            .map(|name| Line::from(name.as_str()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.selected_category)
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .block(pane_block("Categories", focused));
        frame.render_widget(tabs, area);
    }

    fn draw_feed(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focused_pane == Pane::Feed;
        let block = pane_block("Posts", focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.is_loading() {
            frame.render_widget(self.loading_line(), inner);
            return;
        }
        if let Some(err) = self.fetch_error() {
            frame.render_widget(error_line(err), inner);
            return;
        }
        let Some(posts) = self.filtered.as_ref() else {
            return;
        };
        if posts.is_empty() {
            let text = format!("No posts tagged {}.", self.selected_category_name());
            frame.render_widget(Paragraph::new(text), inner);
            return;
        }

        let width = inner.width as usize;
        let items: Vec<ListItem> = posts
            .iter()
            .map(|post| ListItem::new(vec![
                Line::from(Span::styled(
                    truncate_to_width(&post.title, width.saturating_sub(2)),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    truncate_to_width(&feed_meta(post), width.saturating_sub(2)),
                    Style::default().fg(Color::DarkGray),
                )),
            ]))
            .collect();
        let list = List::new(items).highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        let mut state = ListState::default();
        state.select(Some(self.selected_post));
        frame.render_stateful_widget(list, inner, &mut state);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let hint = format!("config: {}", self.config_path);
        let width = area.width as usize;
        let mut left = self.status_message.clone();
        let left_width = UnicodeWidthStr::width(left.as_str());
        let hint_width = UnicodeWidthStr::width(hint.as_str());
        if left_width + hint_width + 2 <= width {
            let pad = width - left_width - hint_width;
            left.push_str(&" ".repeat(pad));
            left.push_str(&hint);
        }
        let status = Paragraph::new(Line::from(Span::styled(
            left,
            Style::default().fg(Color::Gray),
        )));
        frame.render_widget(status, area);
    }

    fn draw_details(&self, frame: &mut Frame, post: &Post) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(2),
            ])
            .split(frame.size());

        let back = Paragraph::new(Line::from(Span::styled(
            "← Back (Esc)",
            Style::default().fg(Color::Blue),
        )));
        frame.render_widget(back, chunks[0]);

        let image = Paragraph::new(format!("[image: {}]", thumbnail_label(post)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(image, chunks[1]);

        let title = Paragraph::new(Line::from(Span::styled(
            post.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(title, chunks[2]);

        let width = chunks[3].width.saturating_sub(2).max(10) as usize;
        let body_lines: Vec<Line> = textwrap::wrap(&post.body, width)
            .into_iter()
            .map(|cow| Line::from(cow.into_owned()))
            .collect();
        let body = Paragraph::new(body_lines);
        frame.render_widget(body, chunks[3]);

        let footer = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("User ID: {}", post.user_id),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("    "),
            Span::styled(
                format!("Views: {}", post.view_count()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        frame.render_widget(footer, chunks[4]);
    }

    fn draw_filter_modal(&self, frame: &mut Frame) {
        let area = centered_rect(40, 40, frame.size());
        frame.render_widget(Clear, area);
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("Date", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(
                "Author",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("Tags", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(Span::styled(
                "Back (Esc) · Done (Enter)",
                Style::default().fg(Color::Blue),
            )),
        ];
        let modal = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Filter By")
                .title_alignment(Alignment::Center),
        );
        frame.render_widget(modal, area);
    }

    fn loading_line(&self) -> Paragraph<'static> {
        Paragraph::new(Line::from(Span::styled(
            format!("{} Loading posts…", self.spinner.frame()),
            Style::default().fg(Color::Cyan),
        )))
    }
}

fn error_line(err: &crate::api::FetchError) -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(
        format!("Error: {}", err),
        Style::default().fg(Color::Red),
    )))
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn feed_meta(post: &Post) -> String {
    let mut meta = String::new();
    for tag in &post.tags {
        meta.push('#');
        meta.push_str(tag);
        meta.push(' ');
    }
    if !meta.is_empty() {
        meta.push_str("· ");
    }
    meta.push_str(&format!("Views: {}", post.view_count()));
    meta
}

fn thumbnail_label(post: &Post) -> &str {
    if post.thumbnail.trim().is_empty() {
        "none"
    } else {
        post.thumbnail.as_str()
    }
}

fn step(current: usize, delta: i64, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    let next = current as i64 + delta;
    next.clamp(0, total as i64 - 1) as usize
}

/// Truncates to a display width, appending an ellipsis when anything was cut.
/// Width is measured in terminal columns, so wide glyphs count double.
fn truncate_to_width(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    let budget = width.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        used += ch_width;
        out.push(ch);
    }
    out.push('…');
    out
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchError;
    use crate::data::{sample_posts, MockPostService};

    fn settle(model: &mut Model) {
        while model.is_loading() {
            model.poll_fetch();
            std::thread::yield_now();
        }
    }

    fn settled_model(service: MockPostService) -> Model {
        let mut model = Model::new(Options {
            status_message: String::new(),
            categories: feed::default_categories(),
            service: Some(Arc::new(service)),
            config_path: "~/.config/tagfeed/config.yaml".into(),
        });
        settle(&mut model);
        model
    }

    #[test]
    fn successful_fetch_fills_both_lists() {
        let model = settled_model(MockPostService::with_posts(sample_posts()));
        assert!(!model.is_loading());
        assert_eq!(model.data().map(<[_]>::len), Some(2));
        assert_eq!(model.filtered.as_ref().map(Vec::len), Some(2));
        assert!(model.status_message.contains("Loaded 2 posts"));
    }

    #[test]
    fn failed_fetch_reaches_error_state() {
        let model = settled_model(MockPostService::with_error(FetchError::HttpStatus {
            status: 500,
        }));
        assert!(!model.is_loading());
        assert!(model.data().is_none());
        assert!(model.filtered.is_none());
        assert!(model.status_message.starts_with("Error:"));
        assert!(model.status_message.contains("500"));
    }

    #[test]
    fn category_selection_narrows_then_widens_feed() {
        let mut model = settled_model(MockPostService::with_posts(sample_posts()));

        let history = model
            .categories
            .iter()
            .position(|name| name == "history")
            .expect("history in vocabulary");
        model.select_category(history);
        let narrowed: Vec<i64> = model
            .filtered
            .as_ref()
            .unwrap()
            .iter()
            .map(|post| post.id)
            .collect();
        assert_eq!(narrowed, vec![1]);

        model.select_category(0);
        let widened: Vec<i64> = model
            .filtered
            .as_ref()
            .unwrap()
            .iter()
            .map(|post| post.id)
            .collect();
        assert_eq!(widened, vec![1, 2]);
    }

    #[test]
    fn opening_a_post_forwards_the_exact_record() {
        let mut model = settled_model(MockPostService::with_posts(sample_posts()));
        model.focused_pane = Pane::Feed;
        model.selected_post = 1;
        let expected = model.filtered.as_ref().unwrap()[1].clone();

        model.open_selected_post();
        match &model.screen {
            Screen::Details(post) => assert_eq!(post, &expected),
            Screen::Home => panic!("expected details screen"),
        }
    }

    #[test]
    fn carousel_ignores_category_selection() {
        let mut model = settled_model(MockPostService::with_posts(sample_posts()));
        let history = model
            .categories
            .iter()
            .position(|name| name == "history")
            .unwrap();
        model.select_category(history);
        // Feed narrowed, carousel source untouched.
        assert_eq!(model.filtered.as_ref().map(Vec::len), Some(1));
        assert_eq!(model.data().map(<[_]>::len), Some(2));
    }

    #[test]
    fn filter_modal_is_a_stub() {
        let mut model = settled_model(MockPostService::with_posts(sample_posts()));
        let before = model.filtered.clone();
        model.handle_key(KeyCode::Char('f')).unwrap();
        assert!(model.filter_modal_visible);
        model.handle_key(KeyCode::Enter).unwrap();
        assert!(!model.filter_modal_visible);
        assert_eq!(model.filtered, before);
        assert_eq!(model.selected_category, 0);
    }

    #[test]
    fn refresh_starts_a_fresh_activation() {
        let mut model = settled_model(MockPostService::with_posts(sample_posts()));
        model.reload_posts();
        assert!(model.is_loading());
        assert!(model.filtered.is_none());
        settle(&mut model);
        assert_eq!(model.filtered.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn details_screen_returns_home() {
        let mut model = settled_model(MockPostService::with_posts(sample_posts()));
        model.open_selected_post();
        assert!(matches!(model.screen, Screen::Details(_)));
        model.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(model.screen, Screen::Home);
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_to_width("abc", 6), "abc");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
    }

    #[test]
    fn truncate_counts_wide_glyphs() {
        // Crab is two columns; only one fits next to the ellipsis.
        assert_eq!(truncate_to_width("🦀🦀🦀", 3), "🦀…");
    }

    #[test]
    fn step_clamps_at_both_ends() {
        assert_eq!(step(0, -1, 3), 0);
        assert_eq!(step(2, 1, 3), 2);
        assert_eq!(step(1, 1, 3), 2);
        assert_eq!(step(0, 1, 0), 0);
    }

    #[test]
    fn feed_meta_defaults_views_and_skips_missing_tags() {
        let post = Post {
            id: 9,
            title: "T9".into(),
            body: String::new(),
            user_id: 1,
            tags: Vec::new(),
            thumbnail: String::new(),
            views: None,
        };
        assert_eq!(feed_meta(&post), "Views: 0");
    }
}
