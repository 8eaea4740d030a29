//! Command-line interface definition using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ralph_models::StoryStatus;

/// Build version string with git hash and build date.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    // Format: "0.3.0 (abc1234, 2026-01-29)"
    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// Ralph Board - dashboard for the Ralph autonomous coding loop
#[derive(Parser, Debug)]
#[command(name = "ralph-board")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to state directory
    #[arg(short, long, env = "RALPH_BOARD_STATE_DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    /// Project root to watch (overrides the saved project path)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the live dashboard (default)
    Board,

    /// Show session status and the kanban columns
    Status,

    /// Show iterations parsed from progress.txt
    Log {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the loop prompt for the agent
    Prompt,

    /// Convert a requirements document into prd.json using the API
    Convert {
        /// Requirements document ("-" for stdin)
        #[arg(required = true)]
        file: PathBuf,

        /// Where to write the PRD (default: <project>/.ralph/prd.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a prompt for converting a document by hand
    ConvertPrompt {
        /// Requirements document ("-" for stdin)
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Write prd.json from a pasted model response
    Import {
        /// File holding the response ("-" for stdin)
        #[arg(required = true)]
        file: PathBuf,

        /// Where to write the PRD (default: <project>/.ralph/prd.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Move a story to another status in prd.json
    SetStatus {
        /// Story ID
        #[arg(required = true)]
        story_id: String,

        /// New status
        #[arg(required = true, value_enum)]
        status: StatusArg,
    },

    /// Show or change saved settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Show current settings (API key masked)
    Show,

    /// Change one or more settings
    Set {
        /// API key for the conversion API
        #[arg(long)]
        api_key: Option<String>,

        /// Project root containing .ralph/
        #[arg(long)]
        project_path: Option<String>,

        /// Iteration cap for the loop
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_iterations: Option<u32>,
    },

    /// Forget all saved settings
    Reset,
}

/// Story status accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Backlog,
    InProgress,
    Testing,
    Done,
    Failed,
}

impl From<StatusArg> for StoryStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Backlog => StoryStatus::Backlog,
            StatusArg::InProgress => StoryStatus::InProgress,
            StatusArg::Testing => StoryStatus::Testing,
            StatusArg::Done => StoryStatus::Done,
            StatusArg::Failed => StoryStatus::Failed,
        }
    }
}

impl Cli {
    /// Returns the state directory path, using default if not specified.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(ralph_core::config::state_dir)
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Whether the dashboard will own the terminal.
    pub fn is_board(&self) -> bool {
        matches!(self.command, None | Some(Commands::Board))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        // No args opens the dashboard
        let cli = Cli::parse_from(["ralph-board"]);
        assert!(cli.command.is_none());
        assert!(cli.is_board());
    }

    #[test]
    fn test_cli_parse_log_json() {
        let cli = Cli::parse_from(["ralph-board", "log", "--json"]);
        assert!(matches!(cli.command, Some(Commands::Log { json: true })));
        assert!(!cli.is_board());
    }

    #[test]
    fn test_cli_parse_convert() {
        let cli = Cli::parse_from(["ralph-board", "convert", "brief.md", "-o", "out.json"]);
        match cli.command {
            Some(Commands::Convert { file, output }) => {
                assert_eq!(file, PathBuf::from("brief.md"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("Expected Convert command"),
        }
    }

    #[test]
    fn test_cli_parse_set_status() {
        let cli = Cli::parse_from(["ralph-board", "set-status", "story-2", "in-progress"]);
        match cli.command {
            Some(Commands::SetStatus { story_id, status }) => {
                assert_eq!(story_id, "story-2");
                assert_eq!(StoryStatus::from(status), StoryStatus::InProgress);
            }
            _ => panic!("Expected SetStatus command"),
        }
    }

    #[test]
    fn test_cli_parse_settings_set() {
        let cli = Cli::parse_from([
            "ralph-board",
            "settings",
            "set",
            "--max-iterations",
            "25",
            "--project-path",
            "~/app",
        ]);
        match cli.command {
            Some(Commands::Settings {
                action:
                    SettingsAction::Set {
                        api_key,
                        project_path,
                        max_iterations,
                    },
            }) => {
                assert!(api_key.is_none());
                assert_eq!(project_path.as_deref(), Some("~/app"));
                assert_eq!(max_iterations, Some(25));
            }
            _ => panic!("Expected Settings Set command"),
        }
    }

    #[test]
    fn test_cli_rejects_zero_iterations() {
        let result = Cli::try_parse_from(["ralph-board", "settings", "set", "--max-iterations", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_global_project_flag() {
        let cli = Cli::parse_from(["ralph-board", "status", "--project", "/work/app"]);
        assert_eq!(cli.project, Some(PathBuf::from("/work/app")));
    }

    #[test]
    fn test_cli_verbose() {
        let cli = Cli::parse_from(["ralph-board", "-vvv"]);
        assert_eq!(cli.verbose, 3);
        assert_eq!(cli.log_level(), tracing::Level::TRACE);
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }
}
