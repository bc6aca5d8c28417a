//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "streamchat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Streaming endpoint (e.g., http://localhost:7861)
    #[arg(short, long, global = true)]
    pub base_url: Option<String>,

    /// Milliseconds a stopped stream stays open before it is released
    #[arg(long, global = true)]
    pub grace_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(url) = &self.base_url {
            config.base_url.clone_from(url);
        }
        if let Some(ms) = self.grace_ms {
            config.grace_delay_ms = ms;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one prompt and print the answer as it streams
    Ask {
        /// Prompt text
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,

        /// Stop the stream after this many tokens
        #[arg(long)]
        stop_after: Option<usize>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigSubcommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommands {
    /// Initialize a new config file
    Init,
    /// Print config file location
    Where,
    /// Print the effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_loaded_values() {
        let cli = Cli::parse_from(["streamchat", "--base-url", "http://h:1", "--grace-ms", "5"]);
        let mut config = AppConfig::default();

        cli.apply_overrides(&mut config);

        assert_eq!(config.base_url, "http://h:1");
        assert_eq!(config.grace_delay_ms, 5);
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::parse_from(["streamchat", "ask", "--stop-after", "3", "hello", "world"]);

        match cli.command {
            Some(Commands::Ask { prompt, stop_after }) => {
                assert_eq!(prompt.join(" "), "hello world");
                assert_eq!(stop_after, Some(3));
            }
            other => panic!("Expected ask command, got {other:?}"),
        }
    }

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::parse_from(["streamchat"]);
        assert!(cli.command.is_none());
    }
}
