use clap::Parser;
use log::{error, info};

use zettelclip::{App, Cli, Config};

pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

fn load_config(cli: &Cli) -> zettelclip::Result<Config> {
    let mut config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    if let Some(vault) = &cli.vault {
        config.vault_dir = vault.clone();
    }
    if let Some(command) = &cli.clipboard_command {
        config.clipboard_command = Some(command.clone());
    }

    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let mut app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = app.run(cli.command).await {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
