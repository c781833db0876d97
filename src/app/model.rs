use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::LayoutMode;
use crate::document::{ControllerConfig, DocumentController};
use crate::preview::{self, Preview};
use crate::store::KeyValueStore;
use crate::ui::viewport::Viewport;

/// How long a toast stays on screen.
const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Controller over whichever store the session was started with.
pub type Controller = DocumentController<Box<dyn KeyValueStore>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// The complete application state.
///
/// All state lives here; the document itself is owned by the controller.
pub struct Model {
    /// The document buffer and its persistence
    pub document: Controller,
    /// Which panes are on screen
    pub layout: LayoutMode,
    /// Terminal size in cells
    pub terminal_size: (u16, u16),
    /// Scroll state of the editor pane, in buffer lines
    pub editor_viewport: Viewport,
    /// Scroll state of the preview pane, in rendered rows
    pub preview_viewport: Viewport,
    /// Text of the import path prompt while it is open
    pub import_prompt: Option<String>,
    /// Path accepted for import, waiting to be handed to a worker
    pub import_request: Option<PathBuf>,
    /// Name of the file a worker is currently reading
    pub importing: Option<String>,
    /// Directory exports are written to
    pub export_dir: PathBuf,
    /// Whether the shortcut overlay is visible
    pub help_visible: bool,
    /// Whether the app should quit
    pub should_quit: bool,
    preview: Preview,
    preview_key: Option<(u64, usize)>,
    toast: Option<Toast>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("document", &self.document)
            .field("layout", &self.layout)
            .field("terminal_size", &self.terminal_size)
            .field("importing", &self.importing)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Open the document over `store` and size the panes for the terminal.
    pub fn new(
        config: ControllerConfig,
        store: Box<dyn KeyValueStore>,
        terminal_size: (u16, u16),
    ) -> Self {
        let document = DocumentController::open(config, store);
        let mut model = Self {
            document,
            layout: LayoutMode::default(),
            terminal_size,
            editor_viewport: Viewport::default(),
            preview_viewport: Viewport::default(),
            import_prompt: None,
            import_request: None,
            importing: None,
            export_dir: PathBuf::from("."),
            help_visible: false,
            should_quit: false,
            preview: Preview::default(),
            preview_key: None,
            toast: None,
        };
        model.reflow();
        model
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self.reflow();
        self
    }

    #[must_use]
    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    /// The rendered preview as of the last [`Model::refresh_preview`].
    pub const fn preview(&self) -> &Preview {
        &self.preview
    }

    /// Re-render the preview if the text or the pane width changed.
    ///
    /// Returns whether a render happened.
    pub fn refresh_preview(&mut self) -> bool {
        let Some(width) = crate::ui::preview_content_width(self.terminal_size.0, self.layout)
        else {
            return false;
        };
        let key = (self.document.revision(), usize::from(width));
        if self.preview_key == Some(key) {
            return false;
        }
        self.preview = preview::render(&self.document.text(), key.1);
        self.preview_key = Some(key);
        self.preview_viewport.set_total(self.preview.line_count());
        tracing::trace!(
            revision = key.0,
            width = key.1,
            rows = self.preview.line_count(),
            "preview rendered"
        );
        true
    }

    /// Recompute pane heights after a resize or layout change.
    pub fn reflow(&mut self) {
        let rows = usize::from(crate::ui::pane_height(self.terminal_size.1));
        self.editor_viewport.resize(rows);
        self.preview_viewport.resize(rows);
        self.sync_editor_viewport();
    }

    /// Keep the editor cursor on screen.
    pub fn sync_editor_viewport(&mut self) {
        let buffer = self.document.buffer();
        self.editor_viewport.set_total(buffer.line_count());
        self.editor_viewport.ensure_visible(buffer.cursor().line);
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.show_toast_at(level, message, Instant::now());
    }

    pub(super) fn show_toast_at(
        &mut self,
        level: ToastLevel,
        message: impl Into<String>,
        now: Instant,
    ) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: now + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub(super) fn toast_deadline(&self) -> Option<Instant> {
        self.toast.as_ref().map(|toast| toast.expires_at)
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}
