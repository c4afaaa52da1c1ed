use crate::catalog::Catalog;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::prefs::Preferences;
use crate::store::StoreClient;
use crate::ui::renderfns::{draw_footer, draw_header, HeaderInfo};
use crate::ui::theme::Theme;
use crate::ui::view::ViewAction;
use crate::ui::views::ProductsView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use std::io::{stdout, Stdout};
use std::time::Duration;
use tracing::{info, warn};

/// How long quitting waits for an add or delete still in flight
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Main application state
pub struct App {
  /// The products screen
  view: ProductsView<StoreClient>,

  /// Local preference storage; None when the state database is unavailable
  prefs: Option<Preferences>,

  theme: Theme,

  /// Header title
  title: String,

  /// Store host shown in the header
  host: String,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let client = StoreClient::new(&config)?;
    let host = client.host().to_string();

    // Preferences are a nicety, the screen works without them
    let prefs = match config.state_db_path().and_then(|p| Preferences::open(&p)) {
      Ok(prefs) => Some(prefs),
      Err(e) => {
        warn!("preferences unavailable: {}", e);
        None
      }
    };
    let dark = match &prefs {
      Some(p) => p.dark_mode().unwrap_or_else(|e| {
        warn!("failed to read theme preference: {}", e);
        false
      }),
      None => false,
    };

    info!(%host, table = %config.store.table, dark, "starting");

    Ok(Self {
      view: ProductsView::new(Catalog::new(client)),
      prefs,
      theme: Theme::new(dark),
      title: config.title().to_string(),
      host,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal, even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    // Let a pending add or delete reach the store before the runtime goes away
    let catalog = self.view.catalog();
    if catalog.is_adding() || catalog.is_removing() {
      info!("waiting for pending changes");
      if tokio::time::timeout(SHUTDOWN_GRACE, self.view.settle())
        .await
        .is_err()
      {
        warn!("pending changes still running at exit");
      }
    }

    result
  }

  async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(100));
    let mut dirty = true;

    while !self.should_quit {
      if dirty {
        terminal.draw(|frame| self.draw(frame))?;
      }

      dirty = match events.next().await {
        Some(Event::Key(key)) => {
          self.handle_key(key);
          true
        }
        Some(Event::Resize) => true,
        Some(Event::Tick) => self.view.tick(),
        None => break,
      };
    }

    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.view.handle_key(key) {
      ViewAction::None => {}
      ViewAction::ToggleTheme => self.toggle_theme(),
      ViewAction::Quit => self.should_quit = true,
    }
  }

  fn toggle_theme(&mut self) {
    self.theme = self.theme.toggled();
    if let Some(prefs) = &self.prefs {
      if let Err(e) = prefs.set_dark_mode(self.theme.dark) {
        warn!("failed to save theme preference: {}", e);
      }
    }
  }

  fn draw(&mut self, frame: &mut Frame) {
    let area = frame.area();
    frame.render_widget(Block::default().style(self.theme.base()), area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Header
        Constraint::Min(1),    // Main content
        Constraint::Length(1), // Footer
      ])
      .split(area);

    let catalog = self.view.catalog();
    let info = HeaderInfo {
      title: &self.title,
      host: &self.host,
      count: catalog.records().len(),
      synced_at: catalog.fetched_at(),
    };
    draw_header(frame, chunks[0], &info, &self.view.shortcuts(), &self.theme);
    draw_footer(frame, chunks[2], &self.view.footer_status(), &self.theme);

    self.view.render(frame, chunks[1], &self.theme);
  }
}
