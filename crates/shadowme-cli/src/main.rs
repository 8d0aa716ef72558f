//! CLI entry point - the composition root.
//!
//! Loads `.env`, parses arguments, installs logging and dispatches to the
//! command handlers.

use clap::Parser;

use shadowme_cli::{Cli, Commands, bootstrap, handlers, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before parsing so env-backed flags see them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let provider = cli.provider_config();

    match cli.command {
        Commands::Serve(args) => {
            let config = bootstrap::server_config(&args, provider);
            handlers::serve::execute(config).await?;
        }
        Commands::Voices { command } => {
            let orchestrator = bootstrap::voice_orchestrator(&provider)?;
            handlers::voices::execute(&orchestrator, command).await?;
        }
        Commands::Status(args) => {
            handlers::status::execute(&args.to_config(), &provider);
        }
    }

    Ok(())
}
