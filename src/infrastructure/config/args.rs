use super::app_config::LogLevel;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "photogallery",
    version,
    about = "Browse recent and searched photos, and watch for new ones",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Photo service API key.
    #[arg(long, env = "FLICKR_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Photo service REST endpoint.
    #[arg(long, value_name = "URL", global = true)]
    pub api_base_url: Option<String>,

    /// Enable desktop notifications.
    #[arg(long, global = true)]
    pub enable_desktop_notifications: Option<bool>,

    /// Seconds between background poll cycles.
    #[arg(long, value_name = "SECS", global = true)]
    pub poll_interval_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List a page of the stored search, or of recent photos.
    List {
        /// Page to list; defaults to the stored page.
        #[arg(long)]
        page: Option<u32>,
    },
    /// Search photos and remember the query.
    Search {
        /// Search text.
        query: String,
        /// Page to list.
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Forget the stored query and go back to recent photos.
    ClearSearch,
    /// Download a page of thumbnails through a fixed set of recycled slots.
    Thumbnails {
        /// Page to load; defaults to the stored page.
        #[arg(long)]
        page: Option<u32>,
        /// Number of display slots to cycle the page through.
        #[arg(long, default_value_t = 8)]
        slots: usize,
        /// Directory delivered thumbnails are written to.
        #[arg(long, value_name = "DIR", default_value = "thumbnails")]
        out: PathBuf,
    },
    /// Check for new photos.
    Poll {
        /// Run a single cycle and exit.
        #[arg(long)]
        once: bool,
    },
    /// Turn background polling on or off, or show its state.
    Polling {
        #[arg(value_enum)]
        switch: PollingSwitch,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PollingSwitch {
    On,
    Off,
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let args = CliArgs::parse_from(["photogallery", "search", "red panda", "--page", "3"]);
        assert_eq!(
            args.command,
            Command::Search {
                query: "red panda".to_string(),
                page: 3
            }
        );
    }

    #[test]
    fn test_parse_thumbnails_defaults() {
        let args = CliArgs::parse_from(["photogallery", "thumbnails"]);
        assert_eq!(
            args.command,
            Command::Thumbnails {
                page: None,
                slots: 8,
                out: PathBuf::from("thumbnails")
            }
        );
    }

    #[test]
    fn test_parse_polling_switch() {
        let args = CliArgs::parse_from(["photogallery", "polling", "off"]);
        assert_eq!(
            args.command,
            Command::Polling {
                switch: PollingSwitch::Off
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from(["photogallery", "poll", "--once", "--log-level", "warn"]);
        assert_eq!(args.command, Command::Poll { once: true });
        assert_eq!(args.log_level, Some(LogLevel::Warn));
    }
}
