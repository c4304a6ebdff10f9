use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use society_ledger::cli::{self, Cli, Commands, FlatsCommands, PasswordCommands, ReportCommands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            data_dir,
            society_name,
        } => cli::init::run(data_dir, society_name),
        Commands::Password { command } => match command {
            PasswordCommands::Set => cli::password::set(),
        },
        Commands::Import { file } => cli::import::run(&file),
        Commands::Flats { command } => match command {
            FlatsCommands::List { wing } => cli::flats::list(wing.as_deref()),
            FlatsCommands::Wings => cli::flats::wings(),
            FlatsCommands::Owner { flat, owner } => cli::flats::owner(&flat, &owner),
        },
        Commands::Report { command } => match command {
            ReportCommands::Summary {
                range,
                wing,
                strategy,
            } => cli::report::summary(range, wing, strategy),
            ReportCommands::Statement {
                flat,
                fund,
                range,
                strategy,
            } => cli::report::statement(&flat, fund, range, strategy),
            ReportCommands::Owner { flat, range } => cli::report::owner(&flat, range),
        },
        Commands::Demo => cli::demo::run(),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Status => cli::status::run(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "society-ledger", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
