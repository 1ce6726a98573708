pub mod html;
pub mod input;
pub mod logging;
pub mod model;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use tracing::{debug, info};

use html::{Collaborators, MessageRenderer};
use input::InputDocument;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "msghtml",
    version,
    about = "Render a chat message record into a safe HTML fragment"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render one message document to stdout
    Render {
        /// JSON document with `context` and `message`; `-` reads stdin
        input: PathBuf,

        /// Offset from UTC used for time labels, in minutes
        #[arg(
            long,
            env = "MSGHTML_UTC_OFFSET_MINUTES",
            default_value_t = 0,
            allow_negative_numbers = true
        )]
        utc_offset_minutes: i32,

        /// Force 24-hour time labels regardless of the document's preference
        #[arg(long, default_value_t = false)]
        twenty_four_hour: bool,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            utc_offset_minutes,
            twenty_four_hour,
        } => run_render(input, utc_offset_minutes, twenty_four_hour),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "msghtml", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn run_render(input: PathBuf, utc_offset_minutes: i32, twenty_four_hour: bool) -> Result<()> {
    let mut document = InputDocument::load(&input)
        .with_context(|| format!("loading {}", input.display()))?;
    document.validate()?;
    if twenty_four_hour {
        document.context.twenty_four_hour_time = true;
    }

    let time = input::time_formatter(utc_offset_minutes)?;
    debug!(
        component = "cli",
        operation = "render",
        utc_offset = %time.offset(),
        twenty_four_hour = document.context.twenty_four_hour_time,
        "Time labels configured"
    );
    let renderer = MessageRenderer::new(Collaborators::default().with_time(time));
    let fragment = renderer.render(&document.context, &document.message);

    info!(
        component = "cli",
        operation = "render",
        message_id = document.message.id,
        bytes = fragment.len(),
        "Rendered message"
    );

    let mut out = std::io::stdout().lock();
    writeln!(out, "{fragment}")?;
    Ok(())
}
