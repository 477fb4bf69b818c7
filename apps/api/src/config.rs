use anyhow::{bail, Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_JD_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Which backend classifies JD responsibilities against the resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
    Llm,
    Keyword,
}

impl std::str::FromStr for MatcherKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(MatcherKind::Llm),
            "keyword" => Ok(MatcherKind::Keyword),
            other => bail!("RESPONSIBILITY_MATCHER must be 'llm' or 'keyword', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub frontend_origin: String,
    pub max_upload_bytes: usize,
    pub jd_cache_ttl_secs: u64,
    pub responsibility_matcher: MatcherKind,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            frontend_origin: std::env::var("FRONTEND_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            jd_cache_ttl_secs: parse_env("JD_CACHE_TTL_SECS", DEFAULT_JD_CACHE_TTL_SECS)?,
            responsibility_matcher: parse_env("RESPONSIBILITY_MATCHER", MatcherKind::Llm)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matcher_kind_parses_case_insensitively() {
        assert_eq!("LLM".parse::<MatcherKind>().unwrap(), MatcherKind::Llm);
        assert_eq!(" keyword ".parse::<MatcherKind>().unwrap(), MatcherKind::Keyword);
        assert!("semantic".parse::<MatcherKind>().is_err());
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u64 = parse_env("INTERNLY_ATS_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("INTERNLY_ATS_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16> = parse_env("INTERNLY_ATS_TEST_BAD_PORT", 8080);
        std::env::remove_var("INTERNLY_ATS_TEST_BAD_PORT");
        assert!(result.is_err());
    }
}
