//! Voices command handlers - inventory listing and cleanup.

use anyhow::Result;

use shadowme_core::SynthesisOrchestrator;

use crate::commands::VoicesCommand;
use crate::presentation::{render_cleanup, render_voices};

pub async fn execute(orchestrator: &SynthesisOrchestrator, command: VoicesCommand) -> Result<()> {
    let output = match command {
        VoicesCommand::List => list(orchestrator).await?,
        VoicesCommand::Cleanup { keep } => cleanup(orchestrator, keep).await?,
    };
    print!("{output}");
    Ok(())
}

/// Render the provider's voice inventory.
pub async fn list(orchestrator: &SynthesisOrchestrator) -> Result<String> {
    let voices = orchestrator.provider().list_voices().await?;
    Ok(render_voices(
        &voices,
        &orchestrator.config().clone_name_prefix,
    ))
}

/// Run one cleanup pass keeping the newest `keep` service clones.
pub async fn cleanup(orchestrator: &SynthesisOrchestrator, keep: usize) -> Result<String> {
    let report = orchestrator.cleanup_voices(keep).await?;
    Ok(render_cleanup(&report, keep))
}
