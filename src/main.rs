use clap::Parser;
use tracing_subscriber::EnvFilter;
use vaultkeeper::cli::commands::list::Selection;
use vaultkeeper::cli::{default_log_level, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(&cli)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve => vaultkeeper::cli::commands::serve::execute(&cli).await,
        Commands::Signup => vaultkeeper::cli::commands::signup::execute(&cli).await,
        Commands::Login => vaultkeeper::cli::commands::login::execute(&cli).await,
        Commands::List {
            logins,
            cards,
            texts,
            binaries,
        } => {
            let selection = Selection::from_flags(logins, cards, texts, binaries);
            vaultkeeper::cli::commands::list::execute(&cli, selection).await
        }
        Commands::Add { ref action } => vaultkeeper::cli::commands::add::execute(&cli, action).await,
        Commands::Keygen => vaultkeeper::cli::commands::keygen::execute(),
        Commands::Completions { shell } => vaultkeeper::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        vaultkeeper::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
