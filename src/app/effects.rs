use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;

use anyhow::{Context, Result};

use crate::app::{App, Message, Model, ToastLevel};

impl App {
    /// Perform the side effects that follow `msg`, after `update` has run.
    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        msg: &Message,
        imports: &Sender<Message>,
    ) {
        match msg {
            Message::Export => match write_export(model) {
                Ok(path) => {
                    model.show_toast(ToastLevel::Info, format!("Exported to {}", path.display()));
                }
                Err(err) => {
                    tracing::warn!(error = %format!("{err:#}"), "export failed");
                    model.show_toast(ToastLevel::Error, format!("Export failed: {err:#}"));
                }
            },
            Message::PromptSubmit | Message::Import(_) => {
                if let Some(path) = model.import_request.take() {
                    model.importing = Some(display_name(&path));
                    spawn_import(path, imports.clone());
                }
            }
            _ => {}
        }
    }
}

/// Write the export payload into the export directory.
///
/// Exporting is a pure read of the document, so repeating it without an
/// edit in between rewrites the same bytes.
fn write_export(model: &Model) -> Result<PathBuf> {
    let payload = model.document.export();
    std::fs::create_dir_all(&model.export_dir)
        .with_context(|| format!("Failed to create {}", model.export_dir.display()))?;
    let path = model.export_dir.join(payload.file_name);
    std::fs::write(&path, &payload.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        bytes = payload.bytes.len(),
        mime = payload.mime_type,
        "exported"
    );
    Ok(path)
}

/// Read `path` on a worker thread and post the result back to the loop.
///
/// The buffer is only touched when the loop handles the resulting
/// [`Message::ImportLoaded`], so a slow read never blocks typing.
pub(super) fn spawn_import(path: PathBuf, tx: Sender<Message>) {
    tracing::debug!(path = %path.display(), "starting import");
    let spawned = thread::Builder::new()
        .name("mdpad-import".to_string())
        .spawn(move || {
            let content = std::fs::read_to_string(&path).map_err(|err| err.to_string());
            let name = path.to_string_lossy().into_owned();
            // The loop may already be gone if the user quit mid-read.
            let _ = tx.send(Message::ImportLoaded { name, content });
        });
    if let Err(err) = spawned {
        tracing::warn!(%err, "failed to spawn import worker");
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
