use std::{sync::Arc, time::Duration};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, info};

use crate::{
  action::Action,
  api::{http_items_service::HttpItemsService, items_service::ItemsService, types::ItemsPublic},
  cli::Cli,
  components::{
    Component, add_item::AddItemDialog, items_list::ItemsList, shared::instruction_footer::InstructionFooter,
    toasts::ToastStack,
  },
  config::Config,
  mode::Mode,
  query_cache::QueryCache,
  tui::{Event, Frame, Tui},
};

pub struct App {
  pub tick_rate: f64,
  pub frame_rate: f64,
  pub items_list: ItemsList,
  pub add_item_dialog: AddItemDialog,
  pub toasts: ToastStack,
  pub instruction_footer: InstructionFooter,
  pub cache: QueryCache<ItemsPublic>,
  pub should_quit: bool,
  pub should_suspend: bool,
  pub mode: Mode,
}

impl App {
  pub fn new(args: &Cli) -> Result<Self> {
    let mut config = Config::new()?;
    if let Some(api_url) = &args.api_url {
      config.api.base_url = api_url.clone();
    }
    if let Some(token) = &args.token {
      config.api.token = Some(token.clone());
    }
    info!("Using items API at {}", config.api.base_url);

    let service = Arc::new(HttpItemsService::new(&config.api)?);
    Ok(Self::with_service(&config, service, args.tick_rate, args.frame_rate))
  }

  pub fn with_service(config: &Config, service: Arc<dyn ItemsService>, tick_rate: f64, frame_rate: f64) -> Self {
    let cache = QueryCache::new();
    App {
      items_list: ItemsList::new(service.clone(), cache.clone(), config.ui.page_size),
      add_item_dialog: AddItemDialog::new(service, cache.clone()),
      toasts: ToastStack::new(Duration::from_secs(config.ui.toast_secs)),
      instruction_footer: InstructionFooter::default(),
      cache,
      tick_rate,
      frame_rate,
      should_quit: false,
      should_suspend: false,
      mode: Mode::default(),
    }
  }

  pub fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.cache.register_action_handler(tx.clone());
    self.items_list.register_action_handler(tx.clone())?;
    self.add_item_dialog.register_action_handler(tx.clone())?;
    self.toasts.register_action_handler(tx)?;
    Ok(())
  }

  pub async fn run(&mut self) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel();

    let mut tui = Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate);
    tui.enter()?;

    self.register_action_handler(action_tx.clone())?;

    loop {
      if let Some(e) = tui.next().await {
        for action in self.handle_event(e).await? {
          action_tx.send(action)?;
        }
      }

      while let Ok(action) = action_rx.try_recv() {
        if action != Action::Tick && action != Action::Render {
          debug!("{action:?}");
        }
        match action {
          Action::Resize(w, h) => {
            tui.resize(Rect::new(0, 0, w, h))?;
            self.render(&mut tui, &action_tx)?;
          },
          Action::Render => self.render(&mut tui, &action_tx)?,
          _ => {},
        }
        for follow_up in self.dispatch(action).await? {
          action_tx.send(follow_up)?;
        }
      }

      if self.should_suspend {
        tui.suspend()?;
        action_tx.send(Action::Resume)?;
        tui = Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate);
        tui.enter()?;
      } else if self.should_quit {
        tui.stop()?;
        break;
      }
    }
    tui.exit()?;
    Ok(())
  }

  /// Turns a terminal event into actions. Keys go to whichever component owns
  /// the current mode, after the global bindings had their chance.
  pub async fn handle_event(&mut self, event: Event) -> Result<Vec<Action>> {
    let mut actions = Vec::new();
    match &event {
      Event::Init => actions.push(Action::Refresh),
      Event::Quit => actions.push(Action::Quit),
      Event::Tick => actions.push(Action::Tick),
      Event::Render => actions.push(Action::Render),
      Event::Resize(x, y) => actions.push(Action::Resize(*x, *y)),
      Event::Key(key) => {
        if let Some(action) = self.global_key_action(*key) {
          actions.push(action);
          return Ok(actions);
        }
      },
      _ => {},
    }

    let component: &mut dyn Component = match self.mode {
      Mode::Browse => &mut self.items_list,
      Mode::Dialog => &mut self.add_item_dialog,
    };
    if let Some(action) = component.handle_events(Some(event)).await? {
      actions.push(action);
    }
    Ok(actions)
  }

  fn global_key_action(&self, key: KeyEvent) -> Option<Action> {
    match key {
      KeyEvent { code: KeyCode::Char('c' | 'C'), modifiers: KeyModifiers::CONTROL, .. } => Some(Action::Quit),
      KeyEvent { code: KeyCode::Char('z' | 'Z'), modifiers: KeyModifiers::CONTROL, .. } => Some(Action::Suspend),
      KeyEvent { code: KeyCode::Char('q'), modifiers: KeyModifiers::NONE, .. } if self.mode == Mode::Browse => {
        Some(Action::Quit)
      },
      _ => None,
    }
  }

  /// Applies an action to the app and every component, returning whatever
  /// follow up actions they produced.
  pub async fn dispatch(&mut self, action: Action) -> Result<Vec<Action>> {
    match action {
      Action::OpenAddItem => self.mode = Mode::Dialog,
      Action::CloseAddItem => self.mode = Mode::Browse,
      Action::Quit => self.should_quit = true,
      Action::Suspend => self.should_suspend = true,
      Action::Resume => self.should_suspend = false,
      _ => {},
    }

    let mut follow_ups = Vec::new();
    let components: [&mut dyn Component; 3] = [&mut self.items_list, &mut self.add_item_dialog, &mut self.toasts];
    for component in components {
      if let Some(follow_up) = component.update(action.clone()).await? {
        follow_ups.push(follow_up);
      }
    }
    Ok(follow_ups)
  }

  fn render(&mut self, tui: &mut Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
    tui.draw(|f| {
      if let Err(e) = self.draw(f) {
        error!("Failed to draw: {:?}", e);
        if let Err(send_err) = action_tx.send(Action::Error(format!("Failed to draw: {:?}", e))) {
          error!("Failed to report draw error: {}", send_err);
        }
      }
    })?;
    Ok(())
  }

  pub fn draw(&mut self, f: &mut Frame<'_>) -> Result<()> {
    let area = f.area();
    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).split(area);

    self.items_list.draw(f, chunks[0])?;
    let instructions = match self.mode {
      Mode::Browse => self.items_list.instructions(),
      Mode::Dialog => self.add_item_dialog.instructions(),
    };
    self.instruction_footer.render(f, chunks[1], instructions);

    self.add_item_dialog.draw(f, area)?;
    self.toasts.draw(f, area)?;
    Ok(())
  }
}
