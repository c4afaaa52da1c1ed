use crate::catalog::Catalog;
use crate::store::{Product, ProductStore};
use crate::ui::components::{FormEvent, KeyResult, ProductFormInput, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_price, truncate, FooterStatus};
use crate::ui::theme::Theme;
use crate::ui::view::{ShortcutInfo, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use tracing::debug;

/// The products screen: search bar, table, add form overlay
pub struct ProductsView<S: ProductStore> {
  catalog: Catalog<S>,
  table_state: TableState,
  search: SearchInput,
  form: ProductFormInput,
}

impl<S: ProductStore> ProductsView<S> {
  pub fn new(catalog: Catalog<S>) -> Self {
    let mut catalog = catalog;
    // Start fetching immediately
    catalog.load();

    Self {
      catalog,
      table_state: TableState::default(),
      search: SearchInput::new(),
      form: ProductFormInput::new(),
    }
  }

  pub fn catalog(&self) -> &Catalog<S> {
    &self.catalog
  }

  fn visible(&self) -> Vec<&Product> {
    self.catalog.visible(self.search.query())
  }

  fn selected_id(&self) -> Option<String> {
    let idx = self.table_state.selected()?;
    self.visible().get(idx).map(|p| p.id.clone())
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Form overlay takes every key while open
    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted(values)) => {
        // Blank name/sku is refused silently and the form stays open
        if self.catalog.add(&values) {
          self.form.reset();
          self.form.hide();
        }
        return ViewAction::None;
      }
      KeyResult::Event(FormEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(_)) => {
        self.table_state.select(Some(0));
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.table_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.table_state.select_previous(),
      KeyCode::Char('g') | KeyCode::Home => self.table_state.select_first(),
      KeyCode::Char('G') | KeyCode::End => self.table_state.select_last(),
      KeyCode::Char('a') => self.form.show(),
      KeyCode::Char('d') | KeyCode::Delete => {
        if let Some(id) = self.selected_id() {
          if !self.catalog.remove(&id) {
            debug!(%id, "delete ignored, another delete in flight");
          }
        }
      }
      KeyCode::Char('r') => self.catalog.refresh(),
      KeyCode::Char('t') => return ViewAction::ToggleTheme,
      KeyCode::Esc if !self.search.query().is_empty() => self.search.clear(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  /// Called on each tick to apply finished requests
  pub fn tick(&mut self) -> bool {
    self.catalog.poll()
  }

  /// Wait for pending requests to report back
  pub async fn settle(&mut self) {
    self.catalog.settle().await;
  }

  /// Header hints for whatever currently has focus
  pub fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.form.is_active() {
      return vec![
        ShortcutInfo::new("enter", "add").with_priority(10),
        ShortcutInfo::new("tab", "next field").with_priority(20),
        ShortcutInfo::new("esc", "cancel").with_priority(30),
      ];
    }
    if self.search.is_active() {
      return vec![
        ShortcutInfo::new("enter", "apply").with_priority(10),
        ShortcutInfo::new("esc", "clear").with_priority(20),
      ];
    }
    vec![
      ShortcutInfo::new("a", "add").with_priority(10),
      ShortcutInfo::new("d", "delete").with_priority(20),
      ShortcutInfo::new("/", "search").with_priority(30),
      ShortcutInfo::new("r", "refresh").with_priority(40),
      ShortcutInfo::new("t", "theme").with_priority(50),
      ShortcutInfo::new("q", "quit").with_priority(60),
    ]
  }

  pub fn footer_status(&self) -> FooterStatus<'_> {
    FooterStatus {
      error: self.catalog.error(),
      loading: self.catalog.is_loading() && self.catalog.is_loaded(),
      saving: self.catalog.is_adding(),
      deleting: self.catalog.is_removing(),
    }
  }

  pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Search bar
        Constraint::Min(1),    // Table
      ])
      .split(area);

    self.search.render(frame, chunks[0], theme);
    self.render_table(frame, chunks[1], theme);
    self
      .form
      .render_overlay(frame, area, theme, self.catalog.is_adding());
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
    let len = self.visible().len();
    ensure_valid_selection(&mut self.table_state, len);

    let title = if self.search.query().is_empty() {
      format!(" Products ({}) ", self.catalog.records().len())
    } else {
      format!(
        " Products ({} of {}) ",
        len,
        self.catalog.records().len()
      )
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(theme.border())
      .style(theme.base());

    if len == 0 {
      let content = if !self.catalog.is_loaded() && self.catalog.is_loading() {
        "Loading…"
      } else if !self.catalog.is_loaded() && self.catalog.error().is_some() {
        "Failed to load products. Press 'r' to retry."
      } else if self.catalog.records().is_empty() {
        "No products yet. Press 'a' to add one."
      } else {
        "No products match the search."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(theme.muted()));
      frame.render_widget(paragraph, area);
      return;
    }

    let header = Row::new(vec![
      Cell::from("Name"),
      Cell::from("SKU"),
      Cell::from(Text::from("Stock").alignment(Alignment::Right)),
      Cell::from(Text::from("Price").alignment(Alignment::Right)),
    ])
    .style(Style::default().fg(theme.accent()).bold());

    let rows: Vec<Row> = self
      .visible()
      .into_iter()
      .enumerate()
      .map(|(i, product)| {
        let row = Row::new(vec![
          Cell::from(truncate(&product.name, 40)),
          Cell::from(truncate(&product.sku, 20)),
          Cell::from(Text::from(product.stock.to_string()).alignment(Alignment::Right)),
          Cell::from(Text::from(format_price(&product.price)).alignment(Alignment::Right)),
        ]);
        if i % 2 == 1 {
          row.style(theme.stripe())
        } else {
          row
        }
      })
      .collect();

    let widths = [
      Constraint::Fill(3),
      Constraint::Fill(2),
      Constraint::Length(8),
      Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
      .header(header)
      .block(block)
      .row_highlight_style(theme.highlight())
      .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut self.table_state);
  }
}
