use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod context;
mod logging;

use context::AppContext;

#[derive(Parser)]
#[command(name = "pomohabit", version, about = "Pomohabit CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Today's notes
    Note {
        #[command(subcommand)]
        action: commands::note::NoteAction,
    },
    /// Work/break timer
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Today's progress across all habits
    Dashboard {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Completions { shell } = command {
        clap_complete::generate(shell, &mut Cli::command(), "pomohabit", &mut std::io::stdout());
        return Ok(());
    }
    // Reset must work even when the existing file no longer parses.
    if let Commands::Config {
        action: commands::config::ConfigAction::Reset,
    } = command
    {
        return commands::config::reset(&context::config_path(&context::data_dir()?));
    }

    let ctx = AppContext::load()?;
    logging::init(&ctx.config.log.level);

    match command {
        Commands::Habit { action } => commands::habit::run(action, &ctx),
        Commands::Note { action } => commands::note::run(action, &ctx),
        Commands::Timer { action } => commands::timer::run(action, &ctx),
        Commands::Dashboard { json } => commands::dashboard::run(json, &ctx),
        Commands::Config { action } => commands::config::run(action, &ctx),
        Commands::Completions { .. } => Ok(()),
    }
}
