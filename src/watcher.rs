//! Turns filesystem activity in the vault into "active file changed" events.
//!
//! The most recently created or modified note becomes the active document,
//! which is the closest a terminal gets to an editor's focused file.
use std::path::Path;

use log::{debug, error, info};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::{ActiveFileEvents, FsWorkspace, Result, Workspace, PLUGIN_DATA_DIR};

/// Watches the vault until Ctrl-C, firing `events` whenever the active note
/// changes.
pub async fn watch_vault(workspace: &FsWorkspace, events: &ActiveFileEvents) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(100);

    // notify calls this from its own thread
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            if let Err(e) = tx.blocking_send(res) {
                error!("Failed to forward file system event: {}", e);
            }
        },
        notify::Config::default(),
    )?;

    let root = workspace.vault_root();
    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("Watching vault: {}", root.display());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(Ok(event)) => handle_vault_event(event, workspace, events),
                Some(Err(e)) => error!("File system watcher error: {}", e),
                None => break,
            },
            _ = &mut shutdown => {
                info!("Stopping vault watcher");
                break;
            }
        }
    }

    Ok(())
}

/// Updates the active document for one filesystem event.
pub fn handle_vault_event(event: notify::Event, workspace: &FsWorkspace, events: &ActiveFileEvents) {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => {
            for path in event.paths {
                if !is_note(&path) || !path.is_file() {
                    continue;
                }
                let Ok(doc) = workspace.document_for(&path) else {
                    continue;
                };
                if workspace.active_document().as_ref() != Some(&doc) {
                    debug!("Active file is now {}", doc.path);
                    workspace.set_active(Some(doc.clone()));
                    events.emit(Some(&doc));
                }
            }
        }
        EventKind::Remove(_) => {
            for path in event.paths {
                let Ok(doc) = workspace.document_for(&path) else {
                    continue;
                };
                if workspace.active_document().as_ref() == Some(&doc) {
                    debug!("Active file {} was removed", doc.path);
                    workspace.set_active(None);
                    events.emit(None);
                }
            }
        }
        _ => {
            // Ignore other events
        }
    }
}

fn is_note(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
        && !path
            .components()
            .any(|c| c.as_os_str() == PLUGIN_DATA_DIR)
}
