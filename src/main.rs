//! inkmind CLI - AI-assisted fiction writing in the terminal.

use clap::{Parser, Subcommand};
use inkmind::cli;
use inkmind::cli::export::ExportOptions;
use inkmind::cli::settings::SettingsChange;
use inkmind::config::load_config;
use inkmind::core::Mode;
use inkmind::core::settings::{AuthorLevel, Pov, ResponseLength, Theme, Tone};
use inkmind::logging::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;

/// Get the version string.
///
/// - Release builds (on a git tag): "0.1.0"
/// - Development builds: "0.1.0-dev (abc1234)"
/// - Dirty working directory: "0.1.0-dev (abc1234-dirty)"
fn version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("INKMIND_GIT_HASH");
    const IS_RELEASE: &str = env!("INKMIND_IS_RELEASE");

    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" {
            VERSION.to_string()
        } else {
            format!("{VERSION}-dev ({GIT_HASH})")
        }
    })
}

#[derive(Parser)]
#[command(name = "inkmind")]
#[command(author, version = version(), about = "AI-assisted fiction writing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive writing session.
    Chat {
        /// Session ID or unique prefix. Defaults to the most recent.
        #[arg(short, long)]
        session: Option<String>,

        /// Initial mode.
        #[arg(short, long, value_enum, default_value_t = Mode::Creative)]
        mode: Mode,
    },

    /// Create a new session.
    New,

    /// List sessions, most recently updated first.
    List {
        /// Maximum number of sessions to show. Defaults to 20.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show a session's messages.
    Show {
        /// Session ID or unique prefix. Defaults to the most recent.
        session: Option<String>,
    },

    /// Send one message and print the reply.
    Send {
        /// The message.
        text: String,

        /// Session ID or unique prefix. Defaults to the most recent.
        #[arg(short, long)]
        session: Option<String>,

        /// Mode for this message.
        #[arg(short, long, value_enum, default_value_t = Mode::Creative)]
        mode: Mode,
    },

    /// Rename a session.
    Rename {
        /// New title.
        title: String,

        /// Session ID or unique prefix. Defaults to the most recent.
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Delete a session. The last remaining session cannot be deleted.
    Delete {
        /// Session ID or unique prefix.
        session: String,
    },

    /// Show word statistics for a session.
    Stats {
        /// Session ID or unique prefix. Defaults to the most recent.
        session: Option<String>,
    },

    /// Export selected passages as a Markdown manuscript.
    Export {
        /// Session ID or unique prefix. Defaults to the most recent.
        #[arg(short, long)]
        session: Option<String>,

        /// Genre line.
        #[arg(long)]
        genre: Option<String>,

        /// Introduction paragraph.
        #[arg(long)]
        intro: Option<String>,

        /// Message ID to include (repeatable).
        #[arg(long)]
        include: Vec<String>,

        /// Message ID to exclude (repeatable).
        #[arg(long)]
        exclude: Vec<String>,

        /// Output file or directory. Defaults to <title>.md in the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// List candidate passages instead of writing.
        #[arg(long)]
        preview: bool,
    },

    /// Have the model edit the whole session into one manuscript.
    Compile {
        /// Session ID or unique prefix. Defaults to the most recent.
        #[arg(short, long)]
        session: Option<String>,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or change writing settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show current settings.
    Show,

    /// Change settings.
    Set {
        #[arg(long, value_enum)]
        tone: Option<Tone>,

        /// Narrative point of view.
        #[arg(long, value_enum)]
        pov: Option<Pov>,

        /// Reply length.
        #[arg(long, value_enum)]
        length: Option<ResponseLength>,

        /// Creativity (temperature) between 0 and 1.
        #[arg(long)]
        creativity: Option<f64>,

        #[arg(long, value_enum)]
        author_level: Option<AuthorLevel>,

        /// Style instruction used with --author-level custom.
        #[arg(long)]
        custom: Option<String>,

        #[arg(long, value_enum)]
        theme: Option<Theme>,
    },
}

fn run(command: Commands) -> inkmind::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging.level);

    match command {
        Commands::Chat { session, mode } => cli::chat::run(&config, session.as_deref(), mode),
        Commands::New => cli::new::run(&config),
        Commands::List { limit } => cli::list::run(&config, limit),
        Commands::Show { session } => cli::show::run(&config, session.as_deref()),
        Commands::Send {
            text,
            session,
            mode,
        } => cli::send::run(&config, session.as_deref(), mode, &text),
        Commands::Rename { title, session } => {
            cli::rename::run(&config, session.as_deref(), &title)
        }
        Commands::Delete { session } => cli::delete::run(&config, &session),
        Commands::Stats { session } => cli::stats::run(&config, session.as_deref()),
        Commands::Export {
            session,
            genre,
            intro,
            include,
            exclude,
            output,
            preview,
        } => cli::export::run(
            &config,
            session.as_deref(),
            ExportOptions {
                genre,
                introduction: intro,
                include,
                exclude,
                output,
                preview,
            },
        ),
        Commands::Compile { session, output } => {
            cli::compile::run(&config, session.as_deref(), output.as_deref())
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show => cli::settings::show(&config),
            SettingsAction::Set {
                tone,
                pov,
                length,
                creativity,
                author_level,
                custom,
                theme,
            } => cli::settings::set(
                &config,
                SettingsChange {
                    tone,
                    pov,
                    length,
                    creativity,
                    author_level,
                    custom_instructions: custom,
                    theme,
                },
            ),
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_validation() => {
            eprintln!("inkmind: {e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("inkmind: error: {e}");
            ExitCode::FAILURE
        }
    }
}
