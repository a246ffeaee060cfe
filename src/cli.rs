use crate::config::{self, Config, ConfigError, SetupOutcome};
use crate::server::{self, ServeOptions};
use crate::ui::{self, SetupStep};
use crate::log_debug;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use std::path::Path;

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "CourseWeaver: AI-powered university course design assistant",
    long_about = "CourseWeaver serves an HTTP API that designs courses, checks learning outcomes, analyzes syllabi and recommends textbooks using a generative model.",
    styles = get_styles(),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Also append log output to this file
    #[arg(long = "log-file", global = true, help = "Append log output to a file")]
    pub log_file: Option<String>,

    /// Suppress non-essential output
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    #[command(
        about = "Start the CourseWeaver API server",
        long_about = "Start the CourseWeaver API server. Host and port default to the HOST and PORT environment variables."
    )]
    Serve {
        /// Address to bind, overrides HOST
        #[arg(long, help = "Address to bind (overrides HOST)")]
        host: Option<String>,

        /// Port to bind, overrides PORT
        #[arg(short, long, help = "Port to bind (overrides PORT)")]
        port: Option<u16>,

        /// Keep documents in memory instead of MongoDB
        #[arg(long, help = "Keep documents in memory instead of MongoDB")]
        memory_store: bool,
    },

    /// Create the .env template and check the environment
    #[command(about = "Create a .env template and verify the configuration")]
    Setup,
}

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Parse arguments, set up logging and run the selected command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();
    let config = Config::from_env();

    if let Err(e) = crate::logger::init(config.debug) {
        eprintln!("{e}");
    }
    if let Some(log_file) = cli.log_file.as_deref() {
        crate::logger::set_log_file(log_file)?;
    }
    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    handle_command(cli.command, config).await
}

pub async fn handle_command(command: Commands, config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            memory_store,
        } => {
            log_debug!(
                "Handling 'serve' with host: {:?}, port: {:?}, memory_store: {}",
                host,
                port,
                memory_store
            );
            server::serve(
                config,
                ServeOptions {
                    host,
                    port,
                    memory_store,
                },
            )
            .await
        }
        Commands::Setup => handle_setup(Path::new(config::ENV_FILE)),
    }
}

/// Write the template if needed, then report what is still missing
fn handle_setup(env_path: &Path) -> anyhow::Result<()> {
    ui::print_heading("🚀 CourseWeaver environment setup");

    match config::write_env_template(env_path)? {
        SetupOutcome::Created => {
            SetupStep::Done.print(&format!("Created {}", env_path.display()));
            ui::print_hint("Edit it and add your Gemini API key.");
        }
        SetupOutcome::AlreadyExists => {
            SetupStep::Done.print(&format!("Found {}", env_path.display()));
        }
    }

    // Pick up whatever is in the file now, not what the process started with
    dotenv::from_path(env_path).ok();
    match config::check_environment(env_path, &Config::from_env()) {
        Ok(()) => {
            SetupStep::Done.print("Gemini API key is set");
            ui::print_hint("Start the server with: courseweaver serve");
            Ok(())
        }
        Err(e @ ConfigError::MissingApiKey) => {
            SetupStep::NeedsAttention.print(&e.to_string());
            ui::print_hint("Get your API key from: https://makersuite.google.com/app/apikey");
            Ok(())
        }
        Err(e) => {
            SetupStep::Failed.print(&e.to_string());
            Err(e.into())
        }
    }
}
