use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "switchwise", version, about = "Switchwise task-switch recommender")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a JSON payload from stdin or a file
    Analyze(commands::analyze::AnalyzeArgs),
    /// Classify a task from its window title, URL and snippet
    Classify(commands::classify::ClassifyArgs),
    /// Evaluate the decision rules for a state, category and suitability
    Decide(commands::decide::DecideArgs),
    /// Show which models are loaded
    Models(commands::models::ModelsArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run the HTTP service
    Serve(commands::serve::ServeArgs),
}

fn main() {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Serve(_) => logging::init_with_default("info"),
        _ => logging::init(),
    }

    let result = match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Classify(args) => commands::classify::run(args),
        Commands::Decide(args) => commands::decide::run(args),
        Commands::Models(args) => commands::models::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Serve(args) => commands::serve::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
