//! 토큰 서비스 설정

use std::env;
use std::path::PathBuf;

use chrono::Duration;

use crate::error::{Error, Result};

/// 기본 최대 토큰 수명 (초)
pub const DEFAULT_MAX_AGE_SECS: i64 = 3600;

/// 토큰 서비스 설정
///
/// MAC 반복 횟수와 길이는 포맷 상수라서 여기에 없습니다.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// 시크릿 파일이 놓이는 namespace 디렉터리
    pub secret_dir: PathBuf,

    /// 최대 토큰 수명
    pub max_age: Duration,
}

impl TokenConfig {
    /// 기본 수명으로 설정 생성
    pub fn new(secret_dir: impl Into<PathBuf>) -> Self {
        Self {
            secret_dir: secret_dir.into(),
            max_age: Duration::seconds(DEFAULT_MAX_AGE_SECS),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// 환경변수에서 설정 로드
    ///
    /// - `OPAQ_SECRET_DIR` (필수)
    /// - `OPAQ_TOKEN_MAX_AGE_SECS` (기본 3600)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 key → value 조회 함수로 설정 로드
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret_dir = lookup("OPAQ_SECRET_DIR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config {
                message: "OPAQ_SECRET_DIR is not set".to_string(),
            })?;

        let max_age_secs = match lookup("OPAQ_TOKEN_MAX_AGE_SECS") {
            Some(raw) => parse_max_age_secs(&raw)?,
            None => DEFAULT_MAX_AGE_SECS,
        };

        let max_age = Duration::try_seconds(max_age_secs).ok_or_else(|| Error::Config {
            message: format!("token max age out of range: {}", max_age_secs),
        })?;

        Ok(Self::new(secret_dir).with_max_age(max_age))
    }
}

/// 양의 정수 초 파싱
pub fn parse_max_age_secs(raw: &str) -> Result<i64> {
    let secs: i64 = raw.trim().parse().map_err(|_| Error::Config {
        message: format!("invalid token max age: {:?}", raw),
    })?;
    if secs <= 0 {
        return Err(Error::Config {
            message: format!("token max age must be positive, got {}", secs),
        });
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TokenConfig::from_lookup(lookup_from(&[("OPAQ_SECRET_DIR", "/var/lib/opaq")]))
            .unwrap();
        assert_eq!(config.secret_dir, PathBuf::from("/var/lib/opaq"));
        assert_eq!(config.max_age, Duration::seconds(3600));
    }

    #[test]
    fn test_custom_max_age() {
        let config = TokenConfig::from_lookup(lookup_from(&[
            ("OPAQ_SECRET_DIR", "/tmp/opaq"),
            ("OPAQ_TOKEN_MAX_AGE_SECS", "900"),
        ]))
        .unwrap();
        assert_eq!(config.max_age, Duration::seconds(900));
    }

    #[test]
    fn test_missing_secret_dir_fails() {
        let result = TokenConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = TokenConfig::from_lookup(lookup_from(&[("OPAQ_SECRET_DIR", "  ")]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_invalid_max_age() {
        assert!(parse_max_age_secs("abc").is_err());
        assert!(parse_max_age_secs("0").is_err());
        assert!(parse_max_age_secs("-5").is_err());
        assert_eq!(parse_max_age_secs(" 60 ").unwrap(), 60);
    }
}
