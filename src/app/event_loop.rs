use std::io::stdout;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, ToastLevel, update};
use crate::debounce::Debouncer;

/// Quiet period before a terminal resize is applied.
const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Longest the loop sleeps in `poll` when nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Poll interval while an import worker is running.
const IMPORT_POLL: Duration = Duration::from_millis(20);

impl App {
    /// Run the main event loop.
    ///
    /// A pending autosave is flushed after the terminal is restored, so
    /// quitting inside the debounce window does not lose the last edit.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let store = self
            .store
            .take()
            .context("The document store was already handed to a previous run")?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; mdpad requires an interactive terminal")?;
        let size = terminal.size()?;

        let mut model = Model::new(self.config.clone(), store, (size.width, size.height))
            .with_layout(self.layout)
            .with_export_dir(self.export_dir.clone());
        tracing::info!(
            words = model.document.word_count(),
            lines = model.document.buffer().line_count(),
            "document opened"
        );

        let (imports_tx, imports_rx) = mpsc::channel();
        if let Some(path) = self.initial_import.clone() {
            Self::dispatch(&mut model, Message::Import(path), &imports_tx);
        }

        let result = execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)
            .context("Failed to enable mouse capture")
            .and_then(|()| Self::event_loop(&mut terminal, &mut model, &imports_tx, &imports_rx));

        let _ = execute!(stdout(), DisableBracketedPaste, DisableMouseCapture);
        ratatui::restore();

        if let Some(Err(err)) = model.document.flush_autosave() {
            tracing::warn!(%err, "final save failed");
            eprintln!("mdpad: {err}");
        }

        result
    }

    /// Apply one message: state first, then its side effects.
    fn dispatch(model: &mut Model, msg: Message, imports: &Sender<Message>) {
        let side_msg = msg.clone();
        update(model, msg, Instant::now());
        Self::handle_message_side_effects(model, &side_msg, imports);
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        imports_tx: &Sender<Message>,
        imports_rx: &Receiver<Message>,
    ) -> Result<()> {
        let mut resize_debouncer = Debouncer::new(RESIZE_DEBOUNCE);
        let mut needs_render = true;

        loop {
            let now = Instant::now();

            if model.expire_toast(now) {
                needs_render = true;
            }

            if let Some((width, height)) = resize_debouncer.take_ready(now) {
                tracing::debug!(width, height, "resize applied");
                update(model, Message::Resize(width, height), now);
                needs_render = true;
            }

            if let Some(result) = model.document.poll_autosave(now) {
                if let Err(err) = result {
                    tracing::warn!(%err, "autosave failed");
                    model.show_toast(ToastLevel::Warning, format!("Autosave failed: {err}"));
                }
                needs_render = true;
            }

            // Finished imports from worker threads
            while let Ok(msg) = imports_rx.try_recv() {
                Self::dispatch(model, msg, imports_tx);
                needs_render = true;
            }

            if needs_render {
                terminal.draw(|frame| Self::view(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }

            let deadlines = [
                model.document.next_deadline(),
                model.toast_deadline(),
                resize_debouncer.deadline(),
            ];
            let idle = if model.importing.is_some() {
                IMPORT_POLL
            } else {
                IDLE_POLL
            };
            if event::poll(poll_timeout(Instant::now(), deadlines, idle))? {
                let msg = Self::handle_event(
                    &event::read()?,
                    model,
                    Instant::now(),
                    &mut resize_debouncer,
                );
                if let Some(msg) = msg {
                    Self::dispatch(model, msg, imports_tx);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::ZERO)? {
                    let msg = Self::handle_event(
                        &event::read()?,
                        model,
                        Instant::now(),
                        &mut resize_debouncer,
                    );
                    if let Some(msg) = msg {
                        Self::dispatch(model, msg, imports_tx);
                        needs_render = true;
                    }
                }
            }
        }
        Ok(())
    }
}

/// How long to wait for input before a scheduled deadline needs service.
fn poll_timeout<const N: usize>(
    now: Instant,
    deadlines: [Option<Instant>; N],
    idle: Duration,
) -> Duration {
    deadlines
        .into_iter()
        .flatten()
        .map(|deadline| deadline.saturating_duration_since(now))
        .fold(idle, Duration::min)
}
