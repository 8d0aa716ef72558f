//! Status command handler - configuration diagnostics.

use std::fmt::Write;

use shadowme_core::{SynthesisConfig, validate_config};
use shadowme_elevenlabs::ElevenLabsConfig;

pub fn execute(synthesis: &SynthesisConfig, provider: &ElevenLabsConfig) {
    print!("{}", render(synthesis, provider));
}

/// Render configuration diagnostics. The API key appears masked only.
pub fn render(synthesis: &SynthesisConfig, provider: &ElevenLabsConfig) -> String {
    let mut out = String::new();
    let key = provider
        .masked_api_key()
        .unwrap_or_else(|| "Not found".to_string());

    let _ = writeln!(out, "Provider");
    let _ = writeln!(out, "  base url         {}", provider.base_url());
    let _ = writeln!(out, "  api key          {key}");
    let _ = writeln!(out, "Synthesis");
    let _ = writeln!(out, "  cache ttl        {}s", synthesis.cache_ttl.as_secs());
    let _ = writeln!(out, "  sweep interval   {}s", synthesis.sweep_interval.as_secs());
    let _ = writeln!(out, "  soft deadline    {}ms", synthesis.soft_deadline.as_millis());
    let _ = writeln!(out, "  provider timeout {}s", synthesis.provider_timeout.as_secs());
    let _ = writeln!(out, "  min audio chars  {}", synthesis.min_audio_chars);
    let _ = writeln!(out, "  default voice    {}", synthesis.default_voice_id);
    let _ = writeln!(out, "  clone prefix     {}", synthesis.clone_name_prefix);

    match validate_config(synthesis) {
        Ok(()) => {
            let _ = writeln!(out, "Configuration OK");
        }
        Err(e) => {
            let _ = writeln!(out, "Configuration INVALID: {e}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_render_masks_key() {
        let provider = ElevenLabsConfig::new().with_api_key("sk_0123456789abcdef");

        let out = render(&SynthesisConfig::with_defaults(), &provider);

        assert!(out.contains("sk_01234..."));
        assert!(!out.contains("sk_0123456789abcdef"));
        assert!(out.contains("cache ttl        1800s"));
        assert!(out.contains("Configuration OK"));
    }

    #[test]
    fn test_render_flags_invalid_config() {
        let synthesis = SynthesisConfig::with_defaults().with_cache_ttl(Duration::ZERO);

        let out = render(&synthesis, &ElevenLabsConfig::new());

        assert!(out.contains("api key          Not found"));
        assert!(out.contains("Configuration INVALID"));
    }
}
