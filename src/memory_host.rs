//! In-memory host backends.
//!
//! These stand in for a real editor in tests: every capability records what
//! the plugin did to it so assertions can inspect it afterwards.
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    path::PathBuf,
};

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::{
    Clipboard, CursorPosition, DocumentRef, Editor, Menu, MenuItem, Notifier, Result,
    SettingsStore, StatusBar, TimeSource, Workspace, ZettelError,
};

/// A vault held entirely in memory.
pub struct MemoryWorkspace {
    root: PathBuf,
    documents: RefCell<HashMap<String, String>>,
    active: RefCell<Option<DocumentRef>>,
    editor: Option<MemoryEditor>,
    fail_writes: Cell<bool>,
}

impl MemoryWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            documents: RefCell::new(HashMap::new()),
            active: RefCell::new(None),
            editor: None,
            fail_writes: Cell::new(false),
        }
    }

    /// Attaches an editor that shows whichever document is active.
    pub fn with_editor(mut self) -> Self {
        self.editor = Some(MemoryEditor::default());
        self
    }

    pub fn insert(&self, path: &str, content: &str) {
        self.documents
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
    }

    pub fn focus(&self, doc: Option<DocumentRef>) {
        *self.active.borrow_mut() = doc;
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.documents.borrow().get(path).cloned()
    }

    pub fn editor(&self) -> Option<&MemoryEditor> {
        self.editor.as_ref()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl Workspace for MemoryWorkspace {
    fn active_document(&self) -> Option<DocumentRef> {
        self.active.borrow().clone()
    }

    fn vault_root(&self) -> PathBuf {
        self.root.clone()
    }

    fn read(&self, doc: &DocumentRef) -> Result<String> {
        self.content(&doc.path)
            .ok_or_else(|| ZettelError::DocumentNotFound {
                path: doc.path.clone(),
            })
    }

    fn modify(&self, doc: &DocumentRef, content: &str) -> Result<()> {
        if self.fail_writes.get() {
            return Err(ZettelError::ApplicationError {
                message: format!("write rejected for {}", doc.path),
            });
        }
        self.insert(&doc.path, content);
        Ok(())
    }

    fn active_editor(&self) -> Option<&dyn Editor> {
        self.active.borrow().as_ref()?;
        self.editor.as_ref().map(|e| e as &dyn Editor)
    }
}

#[derive(Default)]
pub struct MemoryEditor {
    cursor: Cell<Option<CursorPosition>>,
}

impl MemoryEditor {
    pub fn cursor(&self) -> Option<CursorPosition> {
        self.cursor.get()
    }
}

impl Editor for MemoryEditor {
    fn set_cursor(&self, position: CursorPosition) {
        self.cursor.set(Some(position));
    }
}

#[derive(Default)]
pub struct MemoryClipboard {
    contents: RefCell<Option<String>>,
    fail: Cell<bool>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    /// Makes every following write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        if self.fail.get() {
            return Err(ZettelError::ClipboardFailed {
                message: "clipboard unavailable".to_string(),
            });
        }
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryNotifier {
    notices: RefCell<Vec<String>>,
}

impl MemoryNotifier {
    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.notices.borrow().last().cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn notice(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }
}

#[derive(Default)]
pub struct MemoryStatusBar {
    text: RefCell<String>,
}

impl MemoryStatusBar {
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }
}

impl StatusBar for MemoryStatusBar {
    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }
}

#[derive(Default)]
pub struct MemorySettingsStore {
    data: RefCell<Option<Value>>,
}

impl MemorySettingsStore {
    pub fn with_data(data: Value) -> Self {
        Self {
            data: RefCell::new(Some(data)),
        }
    }

    pub fn data(&self) -> Option<Value> {
        self.data.borrow().clone()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Option<Value>> {
        Ok(self.data.borrow().clone())
    }

    fn save(&self, data: &Value) -> Result<()> {
        *self.data.borrow_mut() = Some(data.clone());
        Ok(())
    }
}

/// A context menu that just collects what was added to it.
#[derive(Debug, Default)]
pub struct MemoryMenu {
    pub separators: usize,
    pub items: Vec<MenuItem>,
}

impl Menu for MemoryMenu {
    fn add_separator(&mut self) {
        self.separators += 1;
    }

    fn add_item(&mut self, item: MenuItem) {
        self.items.push(item);
    }
}

/// A clock stuck at one instant, adjustable between steps of a test.
pub struct FixedTime(Cell<NaiveDateTime>);

impl FixedTime {
    pub fn new(now: NaiveDateTime) -> Self {
        Self(Cell::new(now))
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.0.set(now);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> NaiveDateTime {
        self.0.get()
    }
}
