//! CLI 설정

use std::path::PathBuf;

use opaq_core::TokenConfig;

/// 설정 결정 (CLI 옵션 > 환경변수)
pub fn resolve_config(
    secret_dir: Option<PathBuf>,
    max_age_secs: Option<i64>,
) -> anyhow::Result<TokenConfig> {
    resolve_with(secret_dir, max_age_secs, |key| std::env::var(key).ok())
}

fn resolve_with(
    secret_dir: Option<PathBuf>,
    max_age_secs: Option<i64>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<TokenConfig> {
    let config = TokenConfig::from_lookup(|key| match key {
        "OPAQ_SECRET_DIR" => secret_dir
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .or_else(|| env(key)),
        "OPAQ_TOKEN_MAX_AGE_SECS" => max_age_secs.map(|s| s.to_string()).or_else(|| env(key)),
        _ => env(key),
    })
    .map_err(|e| anyhow::anyhow!("{}. Use --secret-dir or set OPAQ_SECRET_DIR", e))?;

    Ok(config)
}
