//! Capabilities the plugin consumes from its host editor.
//!
//! The plugin core never talks to a concrete editor. Every host service is a
//! narrow trait here; the CLI provides filesystem/terminal backends and the
//! tests use the in-memory ones.
use std::{
    cell::RefCell,
    path::PathBuf,
    rc::{Rc, Weak},
};

use chrono::{Local, NaiveDateTime};
use log::trace;
use serde_json::Value;

use crate::Result;

/// A document in the vault, addressed by its vault-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    /// `/`-separated path relative to the vault root
    pub path: String,
}

impl DocumentRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// File name including extension.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// File name without its extension.
    pub fn basename(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }
}

/// Cursor location inside an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub line: usize,
    pub ch: usize,
}

impl CursorPosition {
    /// Position just past the last character of `content`.
    ///
    /// `ch` counts UTF-16 code units, the unit editor hosts use for columns.
    pub fn end_of(content: &str) -> Self {
        let line = content.matches('\n').count();
        let ch = content
            .rsplit('\n')
            .next()
            .map(|last| last.encode_utf16().count())
            .unwrap_or(0);
        Self { line, ch }
    }
}

/// The host's document/workspace model.
pub trait Workspace {
    /// Currently focused document, if any.
    fn active_document(&self) -> Option<DocumentRef>;

    /// Location of the vault on disk.
    fn vault_root(&self) -> PathBuf;

    fn read(&self, doc: &DocumentRef) -> Result<String>;

    /// Replaces the whole content of `doc`.
    fn modify(&self, doc: &DocumentRef, content: &str) -> Result<()>;

    /// Editor showing the active document, when there is one.
    fn active_editor(&self) -> Option<&dyn Editor>;
}

pub trait Editor {
    fn set_cursor(&self, position: CursorPosition);
}

pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Transient user-facing messages.
pub trait Notifier {
    fn notice(&self, message: &str);
}

pub trait StatusBar {
    fn set_text(&self, text: &str);
}

/// Opaque persistence for plugin settings.
pub trait SettingsStore {
    fn load(&self) -> Result<Option<Value>>;
    fn save(&self, data: &Value) -> Result<()>;
}

/// An entry added to a file's context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub title: String,
    pub icon: String,
    pub section: String,
    pub action: MenuAction,
}

/// What happens when a context menu entry is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    CopyFullPath(DocumentRef),
    CopyRelativePath(DocumentRef),
}

/// Per-file popup menu extension point.
pub trait Menu {
    fn add_separator(&mut self);
    fn add_item(&mut self, item: MenuItem);
}

/// Wall-clock source, local time.
pub trait TimeSource {
    fn now(&self) -> NaiveDateTime;
}

pub struct LocalTime;

impl TimeSource for LocalTime {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

type ActiveFileCallback = Box<dyn FnMut(Option<&DocumentRef>)>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: Vec<(u64, Rc<RefCell<ActiveFileCallback>>)>,
}

/// Source of "active document changed" events.
///
/// Callbacks run synchronously on the emitting thread, in subscription order.
#[derive(Clone, Default)]
pub struct ActiveFileEvents {
    subscribers: Rc<RefCell<Subscribers>>,
}

/// Cancellation handle returned by [`ActiveFileEvents::subscribe`].
///
/// Dropping the handle cancels the subscription.
pub struct Subscription {
    id: u64,
    subscribers: Weak<RefCell<Subscribers>>,
}

impl ActiveFileEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(Option<&DocumentRef>) + 'static,
    {
        let mut subscribers = self.subscribers.borrow_mut();
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers
            .callbacks
            .push((id, Rc::new(RefCell::new(Box::new(callback)))));

        Subscription {
            id,
            subscribers: Rc::downgrade(&self.subscribers),
        }
    }

    pub fn emit(&self, doc: Option<&DocumentRef>) {
        // Snapshot so a callback may subscribe or cancel while we iterate.
        let callbacks: Vec<_> = self
            .subscribers
            .borrow()
            .callbacks
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();

        trace!(
            "Emitting active file change to {} subscriber(s): {:?}",
            callbacks.len(),
            doc.map(|d| d.path.as_str())
        );

        for callback in callbacks {
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (*callback)(doc);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().callbacks.len()
    }
}

impl Subscription {
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers
                .borrow_mut()
                .callbacks
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_names() {
        let doc = DocumentRef::new("zettel/202401151230 My Note.md");
        assert_eq!(doc.name(), "202401151230 My Note.md");
        assert_eq!(doc.basename(), "202401151230 My Note");

        let dotted = DocumentRef::new(".hidden");
        assert_eq!(dotted.basename(), ".hidden");
    }

    #[test]
    fn cursor_end_position() {
        assert_eq!(CursorPosition::end_of(""), CursorPosition { line: 0, ch: 0 });
        assert_eq!(
            CursorPosition::end_of("first\nsecond"),
            CursorPosition { line: 1, ch: 6 }
        );
        assert_eq!(
            CursorPosition::end_of("body\n"),
            CursorPosition { line: 1, ch: 0 }
        );
    }

    #[test]
    fn cursor_column_counts_utf16_units() {
        // 'é' is one unit, '📝' is a surrogate pair.
        assert_eq!(
            CursorPosition::end_of("intro\ncafé 📝"),
            CursorPosition { line: 1, ch: 7 }
        );
    }

    #[test]
    fn subscribers_receive_events_until_cancelled() {
        let events = ActiveFileEvents::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let subscription = events.subscribe(move |doc| {
            sink.borrow_mut().push(doc.map(|d| d.path.clone()));
        });

        events.emit(Some(&DocumentRef::new("a.md")));
        events.emit(None);
        assert_eq!(events.subscriber_count(), 1);

        subscription.cancel();
        events.emit(Some(&DocumentRef::new("b.md")));

        assert_eq!(events.subscriber_count(), 0);
        assert_eq!(*seen.borrow(), vec![Some("a.md".to_string()), None]);
    }

    #[test]
    fn dropping_handle_unsubscribes() {
        let events = ActiveFileEvents::new();
        {
            let _subscription = events.subscribe(|_| {});
            assert_eq!(events.subscriber_count(), 1);
        }
        assert_eq!(events.subscriber_count(), 0);
    }
}
