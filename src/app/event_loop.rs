use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::effects::Session;
use crate::app::{App, DEFAULT_DOCUMENT, Message, Model};
use crate::cache::{Debouncer, DraftCache, load_auto_load};
use crate::preview::{FrameRenderer, Renderer};
use crate::store::{FileStore, Store};

/// Pending terminal size, applied once resizing settles.
pub(super) type ResizeDebouncer = Debouncer<(u16, u16)>;

impl App {
    /// Build the initial model and session, hydrating from the store.
    pub(super) fn start_session<S: Store, R: Renderer>(
        &self,
        store: S,
        renderer: R,
        terminal_size: (u16, u16),
    ) -> (Model, Session<S, R>) {
        let mut model = Model::new(DEFAULT_DOCUMENT, terminal_size)
            .with_indent(self.indent)
            .with_author_name(self.author_name.clone().unwrap_or_default());
        model.auto_load = load_auto_load(&store, self.auto_load_default);

        let cache = DraftCache::new(self.draft_key.clone(), self.quiet_period_ms);
        let mut session = Session::new(store, renderer, cache);
        session.mount(&mut model);
        (model, session)
    }

    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let store = FileStore::new(&self.store_dir);
        let renderer = FrameRenderer::new(&self.preview_path, self.open_preview);
        tracing::info!(
            store = %self.store_dir.display(),
            key = %self.draft_key,
            "starting session"
        );

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; tagpad requires an interactive terminal")?;
        let size = terminal.size()?;

        let (mut model, mut session) = self.start_session(store, renderer, (size.width, size.height));

        let result = execute!(stdout(), EnableMouseCapture)
            .context("Failed to enable mouse capture")
            .and_then(|()| Self::event_loop(&mut terminal, &mut model, &mut session));

        // Restore terminal
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }

    fn event_loop<S: Store, R: Renderer>(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        session: &mut Session<S, R>,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                Self::dispatch(model, session, Message::Resize(width, height), now_ms);
                needs_render = true;
            }

            if session.poll(model, now_ms) {
                needs_render = true;
            }

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else {
                session
                    .cache
                    .remaining_ms(now_ms)
                    .map_or(250, |ms| ms.clamp(1, 250))
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so debouncers use accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if let Some(msg) =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer)
                {
                    tracing::trace!(?msg, "message");
                    Self::dispatch(model, session, msg, event_ms);
                    needs_render = true;
                }

                // Coalesce key repeat bursts and pastes into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    if let Some(msg) =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer)
                    {
                        Self::dispatch(model, session, msg, drain_ms);
                        needs_render = true;
                    }
                    if model.should_quit {
                        break;
                    }
                }
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
