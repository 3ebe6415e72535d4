//! Host backends for running the plugin from a terminal against a vault
//! directory.
use std::{
    cell::RefCell,
    fs,
    io::Write,
    path::{Component, Path, PathBuf},
    process::{Command, Stdio},
};

use console::style;
use log::{debug, error, trace};
use serde_json::Value;
use shell_words::split;
use tempfile::NamedTempFile;

use crate::{
    Clipboard, DocumentRef, Editor, Notifier, Result, SettingsStore, StatusBar, Workspace,
    ZettelError,
};

/// Directory inside the vault that holds plugin data.
pub const PLUGIN_DATA_DIR: &str = ".zettelclip";

/// A vault backed by a directory on disk.
pub struct FsWorkspace {
    root: PathBuf,
    active: RefCell<Option<DocumentRef>>,
}

impl FsWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            active: RefCell::new(None),
        }
    }

    pub fn set_active(&self, doc: Option<DocumentRef>) {
        *self.active.borrow_mut() = doc;
    }

    /// Maps a filesystem path (absolute, or relative to the vault) to a
    /// document in this vault.
    pub fn document_for(&self, path: &Path) -> Result<DocumentRef> {
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.root)
                .map_err(|_| ZettelError::DocumentNotFound {
                    path: path.display().to_string(),
                })?
                .to_path_buf()
        } else {
            path.to_path_buf()
        };

        let segments: Vec<String> = relative
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if segments.is_empty() {
            return Err(ZettelError::DocumentNotFound {
                path: path.display().to_string(),
            });
        }

        Ok(DocumentRef::new(segments.join("/")))
    }

    pub fn path_of(&self, doc: &DocumentRef) -> PathBuf {
        doc.path
            .split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

impl Workspace for FsWorkspace {
    fn active_document(&self) -> Option<DocumentRef> {
        self.active.borrow().clone()
    }

    fn vault_root(&self) -> PathBuf {
        self.root.clone()
    }

    fn read(&self, doc: &DocumentRef) -> Result<String> {
        let path = self.path_of(doc);
        if !path.is_file() {
            return Err(ZettelError::DocumentNotFound {
                path: doc.path.clone(),
            });
        }
        debug!("Reading document: {}", path.display());
        Ok(fs::read_to_string(path)?)
    }

    fn modify(&self, doc: &DocumentRef, content: &str) -> Result<()> {
        let path = self.path_of(doc);
        write_atomically(&path, content.as_bytes())?;
        debug!("Document written: {}", path.display());
        Ok(())
    }

    fn active_editor(&self) -> Option<&dyn Editor> {
        None
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        error!("Failed to create temporary file in {}: {}", dir.display(), e);
        ZettelError::Io(e)
    })?;
    temp_file.write_all(bytes)?;
    temp_file.flush()?;

    temp_file.persist(path).map_err(|e| {
        error!("Failed to persist file {}: {}", path.display(), e.error);
        ZettelError::Io(e.error)
    })?;
    Ok(())
}

/// Copies text by piping it to an external clipboard program.
pub struct CommandClipboard {
    command: Option<String>,
}

impl CommandClipboard {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl Clipboard for CommandClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let command = self
            .command
            .as_deref()
            .ok_or_else(|| ZettelError::ClipboardFailed {
                message: "no clipboard command available".to_string(),
            })?;

        let args = split(command).map_err(|e| ZettelError::ClipboardFailed {
            message: format!("Failed to parse clipboard command: {}", e),
        })?;
        let (program, rest) = args.split_first().ok_or_else(|| ZettelError::ClipboardFailed {
            message: "Empty clipboard command".to_string(),
        })?;

        trace!("Piping {} bytes to {}", text.len(), command);
        let mut child = Command::new(program)
            .args(rest)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| ZettelError::ClipboardFailed {
                message: format!("Failed to start {}: {}", program, e),
            })?;

        // stdin is dropped before waiting so the program sees EOF
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };
        let status = child.wait().map_err(|e| ZettelError::ClipboardFailed {
            message: format!("Failed to wait for {}: {}", program, e),
        })?;

        written.map_err(|e| ZettelError::ClipboardFailed {
            message: format!("Failed to write to {}: {}", program, e),
        })?;
        if !status.success() {
            return Err(ZettelError::ClipboardFailed {
                message: format!("{} exited with {}", program, status),
            });
        }

        Ok(())
    }
}

/// Prints notices to stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notice(&self, message: &str) {
        println!("{}", style(message).bold());
    }
}

/// Prints status bar updates to stdout, skipping repeats.
#[derive(Default)]
pub struct ConsoleStatusBar {
    current: RefCell<String>,
}

impl ConsoleStatusBar {
    pub fn text(&self) -> String {
        self.current.borrow().clone()
    }
}

impl StatusBar for ConsoleStatusBar {
    fn set_text(&self, text: &str) {
        let mut current = self.current.borrow_mut();
        if *current == text {
            return;
        }
        *current = text.to_string();

        if text.is_empty() {
            println!("{}", style("[status cleared]").dim());
        } else {
            println!("{} {}", style("[status]").cyan(), text);
        }
    }
}

/// Settings kept as JSON inside the vault.
pub struct FsSettingsStore {
    path: PathBuf,
}

impl FsSettingsStore {
    pub fn new(vault_root: &Path) -> Self {
        Self {
            path: vault_root.join(PLUGIN_DATA_DIR).join("data.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FsSettingsStore {
    fn load(&self) -> Result<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, data: &Value) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        write_atomically(&self.path, json.as_bytes())
    }
}
