//! CLI application handler.
//!
//! Builds the plugin on top of the filesystem/terminal backends and maps each
//! subcommand onto a plugin operation.
use std::{fs, path::Path, rc::Rc};

use console::style;
use log::{debug, info};

use crate::{
    generate_identifier, watch_vault, ActiveFileEvents, CommandClipboard, CommandId, Commands,
    Config, ConsoleNotifier, ConsoleStatusBar, FsSettingsStore, FsWorkspace, LocalTime, Menu,
    MenuItem, Plugin, PluginContext, Result, TimeSource, Workspace, ZettelError,
    MY_SETTING_FIELD, RIBBON_ACTION,
};

/// CLI Application handler - owns the plugin and the backends it runs on
pub struct App {
    workspace: Rc<FsWorkspace>,
    status_bar: Rc<ConsoleStatusBar>,
    events: ActiveFileEvents,
    plugin: Plugin,
}

impl App {
    /// Creates the backends for `config.vault_dir` and loads the plugin.
    ///
    /// The vault is resolved to an absolute path first, so full paths and
    /// watcher events are always rooted.
    pub fn new(config: &Config) -> Result<Self> {
        let vault_dir = fs::canonicalize(&config.vault_dir)
            .ok()
            .filter(|dir| dir.is_dir())
            .ok_or_else(|| ZettelError::ConfigError {
                message: format!("Vault directory not found: {}", config.vault_dir.display()),
            })?;

        let workspace = Rc::new(FsWorkspace::new(&vault_dir));
        let status_bar = Rc::new(ConsoleStatusBar::default());
        let events = ActiveFileEvents::new();

        let clipboard_command = config.get_clipboard_command();
        debug!("Clipboard command: {:?}", clipboard_command);

        let ctx = PluginContext {
            workspace: workspace.clone(),
            clipboard: Rc::new(CommandClipboard::new(clipboard_command)),
            notifier: Rc::new(ConsoleNotifier),
            status_bar: status_bar.clone(),
            settings_store: Rc::new(FsSettingsStore::new(&vault_dir)),
            time: Rc::new(LocalTime),
            notice_style: config.notice_style,
        };
        let plugin = Plugin::load(ctx, &events)?;

        info!("Vault opened: {}", vault_dir.display());
        Ok(Self {
            workspace,
            status_bar,
            events,
            plugin,
        })
    }

    /// Run the CLI application with the given command
    pub async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::CopyPath { file } => {
                self.focus(&file)?;
                self.plugin.execute(CommandId::CopyFullPath)?;
            }

            Commands::CopyRelativePath { file } => {
                self.focus(&file)?;
                self.plugin.execute(CommandId::CopyRelativePath)?;
            }

            Commands::NoteDate { file } => {
                self.focus(&file)?;
                self.plugin.execute(CommandId::CurrentNoteDate)?;
            }

            Commands::AppendId { file } => {
                self.focus(&file)?;
                self.plugin.execute(CommandId::AppendZettelId)?;
            }

            Commands::Run { command, file } => self.handle_run(&command, file.as_deref())?,

            Commands::Commands => print_commands(),

            Commands::Status { file } => {
                self.focus(&file)?;
                if self.status_bar.text().is_empty() {
                    println!("No Zettelkasten ID in {}", file.display());
                }
            }

            Commands::Menu { file, pick } => self.handle_menu(&file, pick)?,

            Commands::Watch => {
                println!(
                    "Watching {} (Ctrl-C to stop)",
                    self.workspace.vault_root().display()
                );
                watch_vault(&self.workspace, &self.events).await?;
            }

            Commands::Settings { set } => self.handle_settings(set)?,

            Commands::NewId => println!("{}", generate_identifier(LocalTime.now())),
        }

        Ok(())
    }

    /// Makes `file` the active document.
    fn focus(&self, file: &Path) -> Result<()> {
        let doc = self.workspace.document_for(file)?;
        if !self.workspace.path_of(&doc).is_file() {
            return Err(ZettelError::DocumentNotFound { path: doc.path });
        }

        self.workspace.set_active(Some(doc.clone()));
        self.events.emit(Some(&doc));
        Ok(())
    }

    /// Runs a command by its palette id, with `file` focused when given.
    fn handle_run(&self, id: &str, file: Option<&Path>) -> Result<()> {
        let command = CommandId::from_id(id).ok_or_else(|| ZettelError::ApplicationError {
            message: format!("Unknown command: {}", id),
        })?;

        if let Some(file) = file {
            self.focus(file)?;
        }

        debug!("Running command {}", command.id());
        self.plugin.execute(command)
    }

    fn handle_menu(&self, file: &Path, pick: Option<usize>) -> Result<()> {
        let doc = self.workspace.document_for(file)?;
        let mut menu = ConsoleMenu::default();
        self.plugin.populate_file_menu(&mut menu, Some(&doc));

        let Some(pick) = pick else {
            menu.print();
            return Ok(());
        };

        let item = pick
            .checked_sub(1)
            .and_then(|idx| menu.items.get(idx))
            .ok_or_else(|| ZettelError::ApplicationError {
                message: format!("No menu entry {} (there are {})", pick, menu.items.len()),
            })?;

        self.plugin.run_menu_action(&item.action)?;
        Ok(())
    }

    fn handle_settings(&mut self, set: Option<String>) -> Result<()> {
        if let Some(value) = set {
            self.plugin.update_setting(&value)?;
            info!("Setting updated");
        }

        println!(
            "{} ({})\n  {}",
            style(MY_SETTING_FIELD.name).bold(),
            MY_SETTING_FIELD.description,
            self.plugin.settings().my_setting
        );
        Ok(())
    }
}

/// Prints the command palette entries and the ribbon shortcut.
fn print_commands() {
    for command in CommandId::ALL {
        println!("{:<24} {}", command.id(), command.name());
    }
    println!(
        "{} {} -> {}",
        style(format!("[ribbon:{}]", RIBBON_ACTION.icon)).dim(),
        RIBBON_ACTION.tooltip,
        RIBBON_ACTION.command.id()
    );
}

/// Context menu rendered as a numbered list.
#[derive(Default)]
struct ConsoleMenu {
    lines: Vec<Option<usize>>,
    items: Vec<MenuItem>,
}

impl ConsoleMenu {
    fn print(&self) {
        for line in &self.lines {
            match line {
                None => println!("{}", style("────────").dim()),
                Some(idx) => {
                    let item = &self.items[*idx];
                    println!(
                        "{}. {} {}",
                        idx + 1,
                        item.title,
                        style(format!("[{}]", item.section)).dim()
                    );
                }
            }
        }
    }
}

impl Menu for ConsoleMenu {
    fn add_separator(&mut self) {
        self.lines.push(None);
    }

    fn add_item(&mut self, item: MenuItem) {
        self.lines.push(Some(self.items.len()));
        self.items.push(item);
    }
}
