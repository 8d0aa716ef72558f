//! Commands enum and subcommand arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use shadowme_axum::bootstrap::{DEFAULT_DATABASE_PATH, DEFAULT_PORT};
use shadowme_core::SynthesisConfig;
use shadowme_core::config::DEFAULT_KEEP_RECENT_VOICES;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server and the cache sweeper
    Serve(ServeArgs),

    /// Inspect or prune the provider's voice inventory
    Voices {
        #[command(subcommand)]
        command: VoicesCommand,
    },

    /// Print configuration diagnostics
    Status(SynthesisArgs),
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoicesCommand {
    /// List every voice on the provider account
    List,

    /// Delete all but the newest cloned voices created by this service
    Cleanup {
        /// Number of recent clones to keep
        #[arg(long, default_value_t = DEFAULT_KEEP_RECENT_VOICES)]
        keep: usize,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "SHADOWME_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// SQLite database for practice progress
    #[arg(long, env = "SHADOWME_DATABASE", default_value = DEFAULT_DATABASE_PATH)]
    pub database: PathBuf,

    /// Allowed CORS origin (repeatable or comma separated; default allows all)
    #[arg(
        long = "allowed-origin",
        env = "SHADOWME_ALLOWED_ORIGINS",
        value_delimiter = ','
    )]
    pub allowed_origins: Vec<String>,

    #[command(flatten)]
    pub synthesis: SynthesisArgs,
}

/// Cache and orchestrator tunables. Unset values keep their defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct SynthesisArgs {
    /// Idle lifetime of a cached voice clone, in seconds
    #[arg(long, env = "SHADOWME_CACHE_TTL_SECS")]
    pub cache_ttl_secs: Option<u64>,

    /// Period of the background cache sweep, in seconds
    #[arg(long, env = "SHADOWME_SWEEP_INTERVAL_SECS")]
    pub sweep_interval_secs: Option<u64>,

    /// Elapsed time after which cloning is abandoned, in milliseconds
    #[arg(long, env = "SHADOWME_SOFT_DEADLINE_MS")]
    pub soft_deadline_ms: Option<u64>,

    /// Minimum length of the recorded audio payload worth cloning from
    #[arg(long, env = "SHADOWME_MIN_AUDIO_CHARS")]
    pub min_audio_chars: Option<usize>,

    /// Cloned voices kept when the provider's voice limit is hit
    #[arg(long, env = "SHADOWME_KEEP_RECENT_VOICES")]
    pub keep_recent_voices: Option<usize>,
}

impl SynthesisArgs {
    pub fn to_config(&self) -> SynthesisConfig {
        let mut config = SynthesisConfig::with_defaults();
        if let Some(secs) = self.cache_ttl_secs {
            config = config.with_cache_ttl(Duration::from_secs(secs));
        }
        if let Some(secs) = self.sweep_interval_secs {
            config = config.with_sweep_interval(Duration::from_secs(secs));
        }
        if let Some(ms) = self.soft_deadline_ms {
            config = config.with_soft_deadline(Duration::from_millis(ms));
        }
        if let Some(chars) = self.min_audio_chars {
            config = config.with_min_audio_chars(chars);
        }
        if let Some(keep) = self.keep_recent_voices {
            config = config.with_keep_recent_voices(keep);
        }
        config
    }
}
