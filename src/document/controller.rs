use std::time::{Duration, Instant};

use crate::debounce::Debouncer;
use crate::editor::{EditorBuffer, MarkupAction, Selection, apply_markup};
use crate::error::{Error, Result};
use crate::store::KeyValueStore;
use crate::words::count_words;

use super::{EXPORT_FILE_NAME, EXPORT_MIME_TYPE, SEED_TEXT, check_import_name};

/// Construction-time settings for a [`DocumentController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Store key the snapshot lives under.
    pub storage_key: String,
    /// Document shown when no snapshot exists.
    pub seed_text: String,
    /// Quiet period before an autosave fires.
    pub autosave_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            storage_key: "markdown".to_string(),
            seed_text: SEED_TEXT.to_string(),
            autosave_delay: Duration::from_millis(300),
        }
    }
}

/// Whether an autosave is waiting for its quiet period to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Idle,
    PendingSave,
}

/// A downloadable copy of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Owns the document buffer and keeps its derived state and snapshot in step.
///
/// Every mutation goes through here: the buffer changes immediately, the
/// word count and revision follow, and the autosave debouncer is re-armed
/// with the full text. [`poll_autosave`](Self::poll_autosave) performs the
/// write once the quiet period has passed.
pub struct DocumentController<S> {
    buffer: EditorBuffer,
    store: S,
    storage_key: String,
    autosave: Debouncer<String>,
    word_count: usize,
    revision: u64,
}

impl<S: KeyValueStore> DocumentController<S> {
    /// Create a controller, restoring the stored snapshot when there is one.
    ///
    /// Restore is best-effort: a missing or empty snapshot, or a store that
    /// cannot be read, leaves the seed text in place.
    pub fn open(config: ControllerConfig, store: S) -> Self {
        let ControllerConfig {
            storage_key,
            seed_text,
            autosave_delay,
        } = config;

        let initial = match store.get(&storage_key) {
            Ok(Some(saved)) if !saved.is_empty() => {
                tracing::info!(key = %storage_key, bytes = saved.len(), "restored snapshot");
                saved
            }
            Ok(_) => {
                tracing::debug!(key = %storage_key, "no snapshot, using seed text");
                seed_text
            }
            Err(err) => {
                tracing::warn!(key = %storage_key, error = %err, "snapshot restore failed");
                seed_text
            }
        };

        Self {
            word_count: count_words(&initial),
            buffer: EditorBuffer::from_text(&initial),
            store,
            storage_key,
            autosave: Debouncer::new(autosave_delay),
            revision: 0,
        }
    }

    /// The full buffer text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Read access for the input surface (cursor, selection, lines).
    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    pub const fn word_count(&self) -> usize {
        self.word_count
    }

    /// Bumped on every mutation; renderers compare it to skip redundant work.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub const fn save_state(&self) -> SaveState {
        if self.autosave.is_pending() {
            SaveState::PendingSave
        } else {
            SaveState::Idle
        }
    }

    /// When the pending autosave is due, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Apply an edit through the input surface.
    ///
    /// `edit` returns whether it changed the text. Cursor-only changes do
    /// not arm the autosave.
    pub fn edit<F>(&mut self, now: Instant, edit: F) -> bool
    where
        F: FnOnce(&mut EditorBuffer) -> bool,
    {
        let changed = edit(&mut self.buffer);
        if changed {
            self.changed(now);
        }
        changed
    }

    /// Move the cursor or selection without touching the text.
    pub fn navigate<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut EditorBuffer),
    {
        edit(&mut self.buffer);
    }

    /// Replace the whole buffer, caret at the end.
    pub fn replace_text(&mut self, text: &str, now: Instant) {
        self.buffer.replace_all(text, text.chars().count());
        self.changed(now);
    }

    /// Wrap `selection` in `prefix`/`suffix` and move the caret after it.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] if `selection` does not fit the buffer;
    /// the buffer is left untouched.
    pub fn apply_markup(
        &mut self,
        selection: Selection,
        prefix: &str,
        suffix: &str,
        now: Instant,
    ) -> Result<Selection> {
        let edit = apply_markup(&self.buffer.text(), selection, prefix, suffix)?;
        self.buffer.replace_all(&edit.text, edit.selection.end);
        self.changed(now);
        Ok(edit.selection)
    }

    /// Apply a toolbar shortcut around the buffer's own selection.
    ///
    /// # Errors
    /// Only fails if the buffer reports a selection outside its own text.
    pub fn apply_action(&mut self, action: MarkupAction, now: Instant) -> Result<Selection> {
        let (prefix, suffix) = action.tokens();
        let selection = self.buffer.selection();
        tracing::debug!(?action, ?selection, "applying markup");
        self.apply_markup(selection, prefix, suffix, now)
    }

    /// Replace the buffer with an imported document.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedFormat`] for a name without the `.md`
    /// extension; the buffer is left untouched.
    pub fn import(&mut self, name: &str, content: &str, now: Instant) -> Result<()> {
        check_import_name(name)?;
        tracing::info!(name, bytes = content.len(), "imported document");
        self.buffer.replace_all(content, 0);
        self.changed(now);
        Ok(())
    }

    /// Snapshot the buffer for download. Does not change any state.
    pub fn export(&self) -> ExportPayload {
        ExportPayload {
            file_name: EXPORT_FILE_NAME,
            mime_type: EXPORT_MIME_TYPE,
            bytes: self.buffer.text().into_bytes(),
        }
    }

    /// Write the snapshot if the quiet period has elapsed.
    ///
    /// Returns `None` when nothing was due.
    ///
    /// # Errors
    /// A failed write yields `Some(Err(Error::StorageUnavailable))`; the
    /// buffer is unaffected and the next edit schedules a fresh attempt.
    pub fn poll_autosave(&mut self, now: Instant) -> Option<Result<()>> {
        let snapshot = self.autosave.take_ready(now)?;
        Some(self.write_snapshot(&snapshot))
    }

    /// Write a pending snapshot immediately, e.g. before quitting.
    pub fn flush_autosave(&mut self) -> Option<Result<()>> {
        let snapshot = self.autosave.flush()?;
        Some(self.write_snapshot(&snapshot))
    }

    fn write_snapshot(&mut self, snapshot: &str) -> Result<()> {
        match self.store.set(&self.storage_key, snapshot) {
            Ok(()) => {
                tracing::debug!(key = %self.storage_key, bytes = snapshot.len(), "autosaved");
                self.buffer.mark_clean();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(key = %self.storage_key, error = %err, "autosave failed");
                Err(err.into())
            }
        }
    }

    fn changed(&mut self, now: Instant) {
        self.revision += 1;
        let text = self.buffer.text();
        self.word_count = count_words(&text);
        self.autosave.call(text, now);
    }
}

impl<S> std::fmt::Debug for DocumentController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentController")
            .field("buffer", &self.buffer)
            .field("storage_key", &self.storage_key)
            .field("autosave", &self.autosave.deadline())
            .field("word_count", &self.word_count)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
