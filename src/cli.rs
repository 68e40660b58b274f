//! Command-line interface for Talentgate

use clap::{Parser, Subcommand};

/// Request-gating and response-reuse gateway for a recruiting chat assistant
#[derive(Parser)]
#[command(name = "talentgate")]
#[command(version)]
#[command(about = "Chat gateway for a recruiting-services assistant")]
#[command(
    long_about = "Talentgate fronts a recruiting-services chat assistant: it rate-limits \
    and bans abusive clients, screens messages for prompt injection, records question \
    analytics, and serves repeated questions from a fuzzy-match response cache."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Talentgate Configuration
# ========================
#
# Every value shown here is the default; omit a section to keep its defaults.
# The assistant API key is NOT configured here: set OPENAI_API_KEY in the
# environment. ASSISTANT_ID may also be set to override assistant.assistant_id.

[server]
host = "0.0.0.0"
port = 8080

[limits]
# Maximum chat message length in characters
max_message_chars = 200
# Fixed rate-limit window and per-window request budget
window_seconds = 60
max_requests = 10
# How long a client stays banned after exceeding the budget
ban_seconds = 300

[cache]
# Per-entry time-to-live
ttl_seconds = 3600
# Oldest-first eviction beyond this many entries
max_entries = 100
# Token-overlap ratio for fuzzy reuse of cached answers
similarity_threshold = 0.6

[analytics]
# Events are stored as "{key_prefix}:question:{epoch_millis}"
key_prefix = "talentgate"
# Upper bound for the GET /analytics scan
scan_limit = 500

[assistant]
base_url = "https://api.openai.com/v1"
# assistant_id = "asst_..."   # omit to provision one on first use
poll_interval_ms = 1000
poll_max_attempts = 30

[cors]
# allowed_origin = "https://example.com"   # omit to allow any origin

[observability]
log_level = "info"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_template_parses_as_valid_config() {
        let config: Config =
            toml::from_str(generate_config_template()).expect("template should parse");
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.max_message_chars, 200);
        assert_eq!(config.cache.similarity_threshold, 0.6);
    }

    #[test]
    fn test_cli_defaults_to_config_toml() {
        let cli = Cli::parse_from(["talentgate"]);
        assert_eq!(cli.config, "config.toml");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_config_subcommand_parses() {
        let cli = Cli::parse_from(["talentgate", "config", "--output", "out.toml"]);
        match cli.command {
            Some(Command::Config { output }) => assert_eq!(output.as_deref(), Some("out.toml")),
            _ => panic!("expected config subcommand"),
        }
    }
}
