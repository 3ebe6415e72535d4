//! The plugin: commands, context menu entries and the note age status bar.
//!
//! A [`Plugin`] is built once from a [`PluginContext`] holding every host
//! capability it needs, and torn down with [`Plugin::unload`].
use std::rc::Rc;

use log::{debug, error, info, warn};

use crate::{
    approximate_distance, copy_full, copy_relative, distance, extract_identifier_from_filename,
    generate_identifier, ActiveFileEvents, Clipboard, CursorPosition, DistanceStyle, DocumentRef,
    Menu, MenuAction, MenuItem, Notifier, Result, Settings, SettingsStore, StatusBar,
    Subscription, TimeSource, Workspace, ZettelError, ZettelId,
};

const NO_ACTIVE_FILE: &str = "No active file";
const NO_ZETTEL_ID: &str = "No valid Zettelkasten ID found in filename";

/// Commands exposed to the host's command palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    CopyFullPath,
    CopyRelativePath,
    CurrentNoteDate,
    AppendZettelId,
}

impl CommandId {
    pub const ALL: [CommandId; 4] = [
        CommandId::CopyFullPath,
        CommandId::CopyRelativePath,
        CommandId::CurrentNoteDate,
        CommandId::AppendZettelId,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            CommandId::CopyFullPath => "copy-file-path",
            CommandId::CopyRelativePath => "copy-relative-path",
            CommandId::CurrentNoteDate => "current-note-date",
            CommandId::AppendZettelId => "append-zettelkasten-id",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommandId::CopyFullPath => "Copy File Path (Full)",
            CommandId::CopyRelativePath => "Copy Relative Path",
            CommandId::CurrentNoteDate => "Current Note Date",
            CommandId::AppendZettelId => "Append Zettelkasten ID",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}

/// A toolbar shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RibbonAction {
    pub icon: &'static str,
    pub tooltip: &'static str,
    pub command: CommandId,
}

pub const RIBBON_ACTION: RibbonAction = RibbonAction {
    icon: "clock",
    tooltip: "Append Zettelkasten ID",
    command: CommandId::AppendZettelId,
};

/// Host capabilities handed to the plugin at startup.
pub struct PluginContext {
    pub workspace: Rc<dyn Workspace>,
    pub clipboard: Rc<dyn Clipboard>,
    pub notifier: Rc<dyn Notifier>,
    pub status_bar: Rc<dyn StatusBar>,
    pub settings_store: Rc<dyn SettingsStore>,
    pub time: Rc<dyn TimeSource>,
    /// Phrase style of the "Current Note Date" notice
    pub notice_style: DistanceStyle,
}

impl PluginContext {
    /// Re-renders the note age for whatever document is active now.
    ///
    /// Best effort: anything that prevents an age from being computed just
    /// clears the status bar.
    pub fn refresh_status(&self) {
        let Some(doc) = self.workspace.active_document() else {
            self.status_bar.set_text("");
            return;
        };

        match extract_identifier_from_filename(doc.basename()) {
            Some(name) => {
                let text = distance(name.id.to_date(), self.time.now()).to_string();
                debug!("Status for {}: {}", doc.path, text);
                self.status_bar.set_text(&text);
            }
            None => {
                debug!("No Zettelkasten ID in {}, clearing status", doc.path);
                self.status_bar.set_text("");
            }
        }
    }
}

pub struct Plugin {
    ctx: Rc<PluginContext>,
    settings: Settings,
    subscription: Option<Subscription>,
}

impl Plugin {
    /// Loads settings, starts listening for active file changes and renders
    /// the initial status.
    pub fn load(ctx: PluginContext, events: &ActiveFileEvents) -> Result<Self> {
        let settings = Settings::load(ctx.settings_store.as_ref())?;
        let ctx = Rc::new(ctx);

        let listener = Rc::clone(&ctx);
        let subscription = events.subscribe(move |_| listener.refresh_status());

        ctx.refresh_status();
        info!("Plugin loaded");

        Ok(Self {
            ctx,
            settings,
            subscription: Some(subscription),
        })
    }

    pub fn unload(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            self.ctx.status_bar.set_text("");
            info!("Plugin unloaded");
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Stores a new value for the settings form field.
    pub fn update_setting(&mut self, value: &str) -> Result<()> {
        self.settings.my_setting = value.to_string();
        self.settings.save(self.ctx.settings_store.as_ref())
    }

    pub fn refresh_status(&self) {
        self.ctx.refresh_status();
    }

    /// Runs a palette command. Failures have already been reported as
    /// notices when this returns an error.
    pub fn execute(&self, command: CommandId) -> Result<()> {
        let outcome = match command {
            CommandId::CopyFullPath => self.copy_full_path().map(drop),
            CommandId::CopyRelativePath => self.copy_relative_path().map(drop),
            CommandId::CurrentNoteDate => self.show_note_date().map(drop),
            CommandId::AppendZettelId => self.append_identifier().map(drop),
        };

        if let Err(e) = &outcome {
            debug!("Command {} did not complete: {}", command.id(), e);
        }
        outcome
    }

    /// Copies the absolute path of the active file.
    pub fn copy_full_path(&self) -> Result<String> {
        let doc = self.require_active()?;
        let full_path = copy_full(&self.ctx.workspace.vault_root(), &doc.path);

        self.write_clipboard(
            &full_path,
            &format!("Copied full path: {}", full_path),
            "Failed to copy full path to clipboard",
        )?;
        Ok(full_path)
    }

    /// Copies the vault-relative path of the active file.
    pub fn copy_relative_path(&self) -> Result<String> {
        let doc = self.require_active()?;
        let relative_path = copy_relative(&doc.path);

        self.write_clipboard(
            &relative_path,
            &format!("Copied relative path: {}", relative_path),
            "Failed to copy relative path to clipboard",
        )?;
        Ok(relative_path)
    }

    /// Shows the creation date encoded in the active file's name and its age.
    pub fn show_note_date(&self) -> Result<String> {
        let doc = self.require_active()?;

        let Some(name) = extract_identifier_from_filename(doc.basename()) else {
            self.ctx.notifier.notice(NO_ZETTEL_ID);
            return Err(ZettelError::MalformedIdentifier {
                name: doc.basename().to_string(),
            });
        };

        let note_date = name.id.to_date();
        let now = self.ctx.time.now();
        let phrase = match self.ctx.notice_style {
            DistanceStyle::Calendar => distance(note_date, now).to_string(),
            DistanceStyle::Approximate => approximate_distance(note_date, now),
        };

        let message = format!("Note date: {}\n{}", note_date.format("%Y-%m-%d %H:%M"), phrase);
        self.ctx.notifier.notice(&message);
        Ok(message)
    }

    /// Appends a fresh identifier on a new line at the end of the active note.
    pub fn append_identifier(&self) -> Result<ZettelId> {
        let doc = self.require_active()?;

        let id = generate_identifier(self.ctx.time.now());
        let content = self
            .ctx
            .workspace
            .read(&doc)
            .and_then(|content| {
                let updated = format!("{}\n{}", content, id);
                self.ctx.workspace.modify(&doc, &updated)?;
                Ok(updated)
            })
            .map_err(|e| {
                error!("Failed to append Zettelkasten ID to {}: {}", doc.path, e);
                self.ctx.notifier.notice("Failed to append Zettelkasten ID");
                e
            })?;

        info!("Appended Zettelkasten ID {} to {}", id, doc.path);
        self.ctx
            .notifier
            .notice(&format!("Appended Zettelkasten ID: {}", id));

        if let Some(editor) = self.ctx.workspace.active_editor() {
            editor.set_cursor(CursorPosition::end_of(&content));
        }

        Ok(id)
    }

    /// Adds the copy entries to a file's context menu.
    pub fn populate_file_menu(&self, menu: &mut dyn Menu, file: Option<&DocumentRef>) {
        let Some(file) = file else {
            return;
        };

        menu.add_separator();
        menu.add_item(MenuItem {
            title: "Copy path".to_string(),
            icon: "copy".to_string(),
            section: "copy".to_string(),
            action: MenuAction::CopyFullPath(file.clone()),
        });
        menu.add_item(MenuItem {
            title: "Copy relative path".to_string(),
            icon: "copy".to_string(),
            section: "copy".to_string(),
            action: MenuAction::CopyRelativePath(file.clone()),
        });
    }

    /// Handles a click on one of the context menu entries.
    pub fn run_menu_action(&self, action: &MenuAction) -> Result<String> {
        match action {
            MenuAction::CopyFullPath(file) => {
                let full_path = copy_full(&self.ctx.workspace.vault_root(), &file.path);
                self.write_clipboard(
                    &full_path,
                    "Path copied to the clipboard",
                    "Failed to copy path to the clipboard.",
                )?;
                Ok(full_path)
            }
            MenuAction::CopyRelativePath(file) => {
                let relative_path = copy_relative(&file.path);
                self.write_clipboard(
                    &relative_path,
                    "Relative path copied to the clipboard",
                    "Failed to copy relative path to the clipboard",
                )?;
                Ok(relative_path)
            }
        }
    }

    fn require_active(&self) -> Result<DocumentRef> {
        self.ctx.workspace.active_document().ok_or_else(|| {
            self.ctx.notifier.notice(NO_ACTIVE_FILE);
            ZettelError::NoActiveFile
        })
    }

    fn write_clipboard(&self, text: &str, success: &str, failure: &str) -> Result<()> {
        match self.ctx.clipboard.write_text(text) {
            Ok(()) => {
                self.ctx.notifier.notice(success);
                Ok(())
            }
            Err(e) => {
                warn!("Clipboard write failed: {}", e);
                self.ctx.notifier.notice(failure);
                Err(e)
            }
        }
    }
}

impl Drop for Plugin {
    fn drop(&mut self) {
        self.unload();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::json;

    use super::*;
    use crate::{
        FixedTime, MemoryClipboard, MemoryMenu, MemoryNotifier, MemorySettingsStore,
        MemoryStatusBar, MemoryWorkspace,
    };

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    struct Harness {
        workspace: Rc<MemoryWorkspace>,
        clipboard: Rc<MemoryClipboard>,
        notifier: Rc<MemoryNotifier>,
        status_bar: Rc<MemoryStatusBar>,
        store: Rc<MemorySettingsStore>,
        time: Rc<FixedTime>,
        events: ActiveFileEvents,
    }

    impl Harness {
        fn new(workspace: MemoryWorkspace) -> Self {
            Self {
                workspace: Rc::new(workspace),
                clipboard: Rc::new(MemoryClipboard::default()),
                notifier: Rc::new(MemoryNotifier::default()),
                status_bar: Rc::new(MemoryStatusBar::default()),
                store: Rc::new(MemorySettingsStore::default()),
                time: Rc::new(FixedTime::new(at(2024, 3, 20, 9, 0))),
                events: ActiveFileEvents::new(),
            }
        }

        fn plugin(&self, notice_style: DistanceStyle) -> Plugin {
            let ctx = PluginContext {
                workspace: self.workspace.clone(),
                clipboard: self.clipboard.clone(),
                notifier: self.notifier.clone(),
                status_bar: self.status_bar.clone(),
                settings_store: self.store.clone(),
                time: self.time.clone(),
                notice_style,
            };
            Plugin::load(ctx, &self.events).unwrap()
        }

        fn focus(&self, path: Option<&str>) {
            let doc = path.map(DocumentRef::new);
            self.workspace.focus(doc.clone());
            self.events.emit(doc.as_ref());
        }
    }

    #[test]
    fn command_table() {
        let ids: Vec<_> = CommandId::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(
            ids,
            [
                "copy-file-path",
                "copy-relative-path",
                "current-note-date",
                "append-zettelkasten-id"
            ]
        );
        assert_eq!(CommandId::from_id("current-note-date"), Some(CommandId::CurrentNoteDate));
        assert_eq!(CommandId::from_id("nope"), None);
        assert_eq!(RIBBON_ACTION.command.name(), "Append Zettelkasten ID");
    }

    #[test]
    fn copy_commands_need_an_active_file() {
        let h = Harness::new(MemoryWorkspace::new("/vault"));
        let plugin = h.plugin(DistanceStyle::Calendar);

        assert!(matches!(plugin.copy_full_path(), Err(ZettelError::NoActiveFile)));
        assert!(matches!(plugin.copy_relative_path(), Err(ZettelError::NoActiveFile)));
        assert_eq!(h.notifier.notices(), vec!["No active file", "No active file"]);
        assert_eq!(h.clipboard.contents(), None);
    }

    #[test]
    fn copies_full_and_relative_paths() {
        let h = Harness::new(MemoryWorkspace::new("/vault"));
        let plugin = h.plugin(DistanceStyle::Calendar);
        h.focus(Some("sub/note.md"));

        let full = plugin.copy_full_path().unwrap();
        assert_eq!(full, copy_full(std::path::Path::new("/vault"), "sub/note.md"));
        assert_eq!(h.clipboard.contents().as_deref(), Some(full.as_str()));
        assert_eq!(h.notifier.last(), Some(format!("Copied full path: {}", full)));

        plugin.execute(CommandId::CopyRelativePath).unwrap();
        assert_eq!(h.clipboard.contents().as_deref(), Some("sub/note.md"));
        assert_eq!(
            h.notifier.last().as_deref(),
            Some("Copied relative path: sub/note.md")
        );
    }

    #[test]
    fn clipboard_failure_is_reported() {
        let h = Harness::new(MemoryWorkspace::new("/vault"));
        let plugin = h.plugin(DistanceStyle::Calendar);
        h.focus(Some("note.md"));
        h.clipboard.fail_writes(true);

        assert!(matches!(
            plugin.copy_full_path(),
            Err(ZettelError::ClipboardFailed { .. })
        ));
        assert_eq!(
            h.notifier.last().as_deref(),
            Some("Failed to copy full path to clipboard")
        );

        assert!(matches!(
            plugin.execute(CommandId::CopyRelativePath),
            Err(ZettelError::ClipboardFailed { .. })
        ));
        assert_eq!(
            h.notifier.last().as_deref(),
            Some("Failed to copy relative path to clipboard")
        );
    }

    #[test]
    fn context_menu_entries() {
        let h = Harness::new(MemoryWorkspace::new("/vault"));
        let plugin = h.plugin(DistanceStyle::Calendar);
        let file = DocumentRef::new("a/b.md");

        let mut menu = MemoryMenu::default();
        plugin.populate_file_menu(&mut menu, Some(&file));
        assert_eq!(menu.separators, 1);
        let titles: Vec<_> = menu.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Copy path", "Copy relative path"]);
        assert!(menu.items.iter().all(|i| i.icon == "copy" && i.section == "copy"));

        plugin.run_menu_action(&menu.items[1].action).unwrap();
        assert_eq!(h.clipboard.contents().as_deref(), Some("a/b.md"));
        assert_eq!(
            h.notifier.last().as_deref(),
            Some("Relative path copied to the clipboard")
        );

        h.clipboard.fail_writes(true);
        assert!(plugin.run_menu_action(&menu.items[0].action).is_err());
        assert_eq!(
            h.notifier.last().as_deref(),
            Some("Failed to copy path to the clipboard.")
        );

        let mut empty = MemoryMenu::default();
        plugin.populate_file_menu(&mut empty, None);
        assert_eq!(empty.separators, 0);
        assert!(empty.items.is_empty());
    }

    #[test]
    fn status_bar_follows_active_file() {
        let h = Harness::new(MemoryWorkspace::new("/vault"));
        let _plugin = h.plugin(DistanceStyle::Calendar);
        assert_eq!(h.status_bar.text(), "");

        h.focus(Some("zk/202301151200 Seed.md"));
        assert_eq!(h.status_bar.text(), "Age: 1 year(s), 2 month(s), 5 day(s) ago");

        h.focus(Some("zk/plain note.md"));
        assert_eq!(h.status_bar.text(), "");

        h.focus(Some("202403200800.md"));
        assert_eq!(h.status_bar.text(), "Age: Today");

        h.focus(None);
        assert_eq!(h.status_bar.text(), "");
        assert!(h.notifier.notices().is_empty());
    }

    #[test]
    fn unload_stops_status_updates() {
        let h = Harness::new(MemoryWorkspace::new("/vault"));
        let mut plugin = h.plugin(DistanceStyle::Calendar);
        assert_eq!(h.events.subscriber_count(), 1);

        h.focus(Some("202301151200.md"));
        assert!(!h.status_bar.text().is_empty());

        plugin.unload();
        assert_eq!(h.events.subscriber_count(), 0);
        assert_eq!(h.status_bar.text(), "");

        h.focus(Some("202301151200.md"));
        assert_eq!(h.status_bar.text(), "");
    }

    #[test]
    fn note_date_notice() {
        let h = Harness::new(MemoryWorkspace::new("/vault"));
        let plugin = h.plugin(DistanceStyle::Calendar);

        h.focus(Some("202301151230 Seed.md"));
        let message = plugin.show_note_date().unwrap();
        assert_eq!(
            message,
            "Note date: 2023-01-15 12:30\nAge: 1 year(s), 2 month(s), 5 day(s) ago"
        );
        assert_eq!(h.notifier.last(), Some(message));

        h.focus(Some("202301151230extra.md"));
        assert!(matches!(
            plugin.show_note_date(),
            Err(ZettelError::MalformedIdentifier { .. })
        ));
        assert_eq!(h.notifier.last().as_deref(), Some(NO_ZETTEL_ID));
    }

    #[test]
    fn note_date_notice_approximate() {
        let h = Harness::new(MemoryWorkspace::new("/vault"));
        let plugin = h.plugin(DistanceStyle::Approximate);

        h.focus(Some("202403100900.md"));
        assert_eq!(
            plugin.show_note_date().unwrap(),
            "Note date: 2024-03-10 09:00\n10 days ago"
        );
    }

    #[test]
    fn append_identifier_writes_and_moves_cursor() {
        let h = Harness::new(MemoryWorkspace::new("/vault").with_editor());
        h.workspace.insert("note.md", "# Title\nbody");
        let plugin = h.plugin(DistanceStyle::Calendar);
        h.focus(Some("note.md"));
        h.time.set(at(2024, 3, 20, 9, 7));

        let id = plugin.append_identifier().unwrap();
        assert_eq!(id.as_str(), "202403200907");
        assert_eq!(
            h.workspace.content("note.md").as_deref(),
            Some("# Title\nbody\n202403200907")
        );
        assert_eq!(
            h.notifier.last().as_deref(),
            Some("Appended Zettelkasten ID: 202403200907")
        );
        assert_eq!(
            h.workspace.editor().and_then(|e| e.cursor()),
            Some(CursorPosition { line: 2, ch: 12 })
        );
    }

    #[test]
    fn append_identifier_without_editor_still_succeeds() {
        let h = Harness::new(MemoryWorkspace::new("/vault"));
        h.workspace.insert("note.md", "");
        let plugin = h.plugin(DistanceStyle::Calendar);
        h.focus(Some("note.md"));

        plugin.execute(CommandId::AppendZettelId).unwrap();
        assert_eq!(h.workspace.content("note.md").as_deref(), Some("\n202403200900"));
    }

    #[test]
    fn append_identifier_reports_failures() {
        let h = Harness::new(MemoryWorkspace::new("/vault"));
        let plugin = h.plugin(DistanceStyle::Calendar);

        assert!(matches!(plugin.append_identifier(), Err(ZettelError::NoActiveFile)));

        h.focus(Some("missing.md"));
        assert!(matches!(
            plugin.append_identifier(),
            Err(ZettelError::DocumentNotFound { .. })
        ));
        assert_eq!(
            h.notifier.last().as_deref(),
            Some("Failed to append Zettelkasten ID")
        );

        h.workspace.insert("note.md", "text");
        h.workspace.fail_writes(true);
        h.focus(Some("note.md"));
        assert!(plugin.append_identifier().is_err());
        assert_eq!(h.workspace.content("note.md").as_deref(), Some("text"));
    }

    #[test]
    fn settings_are_loaded_and_saved() {
        let h = Harness::new(MemoryWorkspace::new("/vault"));
        h.store.save(&json!({ "mySetting": "stored" })).unwrap();

        let mut plugin = h.plugin(DistanceStyle::Calendar);
        assert_eq!(plugin.settings().my_setting, "stored");

        plugin.update_setting("fresh").unwrap();
        assert_eq!(h.store.data(), Some(json!({ "mySetting": "fresh" })));
    }
}
