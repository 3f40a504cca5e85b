use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;
mod notify;
mod sensors;

#[derive(Parser)]
#[command(name = "gosleep", version, about = "Bedtime alarm that nags until you go to sleep")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current bedtime zone and its boundaries as JSON
    Zone(commands::zone::ZoneArgs),
    /// Show zone, timeline and pending alarm
    Status(commands::status::StatusArgs),
    /// Run one bedtime check now, as if the alarm had fired
    Check(commands::check::CheckArgs),
    /// Feed an external event to the monitor
    Event(commands::event::EventArgs),
    /// Run the monitor until interrupted
    Run(commands::run::RunArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Home network and location
    Home {
        #[command(subcommand)]
        action: commands::home::HomeAction,
    },
    /// Recent bedtime checks
    History(commands::history::HistoryArgs),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gosleep=info,gosleep_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Zone(args) => commands::zone::run(args),
        Commands::Status(args) => commands::status::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Event(args) => commands::event::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Home { action } => commands::home::run(action),
        Commands::History(args) => commands::history::run(args),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "gosleep", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
