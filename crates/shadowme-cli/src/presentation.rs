//! Table formatting utilities for CLI output.

use std::fmt::Write;

use shadowme_core::{CleanupReport, ProviderVoice};

/// Truncates a string to a maximum length, adding "..." if needed.
///
/// # Examples
///
/// ```rust
/// use shadowme_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// assert_eq!(truncate_string("Hello World", 8), "Hello...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// A horizontal separator line.
pub fn separator(width: usize) -> String {
    "-".repeat(width)
}

/// Render the voice inventory, marking clones created by this service.
pub fn render_voices(voices: &[ProviderVoice], clone_prefix: &str) -> String {
    if voices.is_empty() {
        return "No voices found on the provider account.\n".to_string();
    }

    let mut out = String::new();
    let ours = voices
        .iter()
        .filter(|v| is_service_clone(v, clone_prefix))
        .count();
    let _ = writeln!(
        out,
        "Found {} voice(s), {} cloned by ShadowME:\n",
        voices.len(),
        ours
    );
    let _ = writeln!(out, "{:<24} {:<32} {:<12} Ours", "Voice ID", "Name", "Category");
    let _ = writeln!(out, "{}", separator(74));

    for voice in voices {
        let _ = writeln!(
            out,
            "{:<24} {:<32} {:<12} {}",
            truncate_string(&voice.voice_id, 24),
            truncate_string(&voice.name, 31),
            voice.category.as_deref().unwrap_or("--"),
            if is_service_clone(voice, clone_prefix) {
                "yes"
            } else {
                ""
            }
        );
    }
    out
}

pub fn render_cleanup(report: &CleanupReport, keep: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Examined {} cloned voice(s), keeping the newest {}.",
        report.examined, keep
    );
    for voice_id in &report.deleted {
        let _ = writeln!(out, "  deleted {voice_id}");
    }
    for voice_id in &report.failed {
        let _ = writeln!(out, "  FAILED  {voice_id}");
    }
    if report.deleted.is_empty() && report.failed.is_empty() {
        let _ = writeln!(out, "Nothing to delete.");
    }
    out
}

fn is_service_clone(voice: &ProviderVoice, clone_prefix: &str) -> bool {
    voice.name.starts_with(clone_prefix) && voice.category.as_deref() == Some("cloned")
}
