use clap::Parser;

use streamchat::cli::{Cli, Commands, ConfigSubcommands, run_ask};
use streamchat::config::AppConfig;
use streamchat::core::Result;
use streamchat::{logging, tui};

fn run_config_command(command: &ConfigSubcommands, config: &AppConfig) {
    match command {
        ConfigSubcommands::Init => match AppConfig::init_default() {
            Ok(path) => {
                println!("✓ Created config file at {}", path.display());
            }
            Err(e) => {
                eprintln!("✗ Failed to create config: {e}");
            }
        },
        ConfigSubcommands::Where => match AppConfig::get_config_path() {
            Some(path) => println!("{}", path.display()),
            None => eprintln!("✗ Could not determine config path"),
        },
        ConfigSubcommands::Show => match config.to_toml() {
            Ok(text) => print!("{text}"),
            Err(e) => eprintln!("✗ Failed to render config: {e}"),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    cli.apply_overrides(&mut config);

    match &cli.command {
        Some(Commands::Config { command }) => {
            run_config_command(command, &config);
        }
        Some(Commands::Ask { prompt, stop_after }) => {
            logging::init_stderr(cli.verbose);

            if let Err(e) = run_ask(&config, prompt.join(" "), *stop_after).await {
                eprintln!("✗ {e}");
                std::process::exit(1);
            }
        }
        None => {
            let _log_guard = logging::init();
            tui::run_tui(&config).await?;

            if let Some(path) = logging::log_file_path() {
                eprintln!("Debug log written to {}", path.display());
            }
        }
    }

    Ok(())
}
