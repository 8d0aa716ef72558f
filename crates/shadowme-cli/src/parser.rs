//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use shadowme_elevenlabs::{DEFAULT_BASE_URL, ElevenLabsConfig};

use crate::commands::Commands;

/// Command-line interface for the ShadowME voice service.
#[derive(Parser, Debug)]
#[command(name = "shadowme")]
#[command(about = "Serve cloned-voice speech for shadowing practice")]
#[command(version)]
pub struct Cli {
    /// ElevenLabs API key
    #[arg(long, env = "ELEVENLABS_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// ElevenLabs API root
    #[arg(long, env = "ELEVENLABS_BASE_URL", global = true, default_value = DEFAULT_BASE_URL)]
    pub elevenlabs_url: String,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Provider configuration from the global options.
    pub fn provider_config(&self) -> ElevenLabsConfig {
        ElevenLabsConfig::new()
            .with_base_url(self.elevenlabs_url.clone())
            .with_optional_api_key(self.api_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::VoicesCommand;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "shadowme",
            "--verbose",
            "--api-key",
            "sk_abcdefghijk",
            "voices",
            "list",
        ]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Voices {
                command: VoicesCommand::List
            }
        ));

        let provider = cli.provider_config();
        assert!(provider.has_api_key());
        assert_eq!(provider.masked_api_key().as_deref(), Some("sk_abcde..."));
    }

    #[test]
    fn test_cleanup_keep_defaults_to_two() {
        let cli = Cli::parse_from(["shadowme", "voices", "cleanup"]);
        assert!(matches!(
            cli.command,
            Commands::Voices {
                command: VoicesCommand::Cleanup { keep: 2 }
            }
        ));
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::parse_from([
            "shadowme",
            "serve",
            "--port",
            "8080",
            "--cache-ttl-secs",
            "60",
            "--allowed-origin",
            "http://a.test,http://b.test",
        ]);
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 8080);
        assert_eq!(args.synthesis.cache_ttl_secs, Some(60));
        assert_eq!(args.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }
}
