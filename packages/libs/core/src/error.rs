//! 공통 에러 타입
//!
//! 토큰 발급/검증과 시크릿 관리에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// opaq 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Token Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("malformed token: {reason}")]
    MalformedToken { reason: String },

    #[error("token signature mismatch")]
    ForgedToken,

    #[error("unsupported token format version: {version}")]
    UnsupportedVersion { version: u8 },

    #[error("token expired")]
    TokenExpired,

    #[error("token issued in the future (created_at {created_at})")]
    TokenNotYetValid { created_at: i64 },

    // ─────────────────────────────────────────────────────────────────────────────
    // Secret / Config Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("secret unavailable: {reason}")]
    SecretUnavailable { reason: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedToken {
            reason: reason.into(),
        }
    }

    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 401 Unauthorized
            Error::MalformedToken { .. }
            | Error::ForgedToken
            | Error::UnsupportedVersion { .. }
            | Error::TokenExpired
            | Error::TokenNotYetValid { .. } => 401,

            // 500 Internal Server Error
            Error::SecretUnavailable { .. } | Error::Config { .. } => 500,
        }
    }

    /// 에러 코드 (클라이언트용)
    ///
    /// 위조/손상/버전 불일치/미래 발급은 모두 `INVALID_TOKEN`으로 합쳐집니다.
    /// 어느 검사에서 실패했는지 클라이언트에 노출하지 않습니다.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedToken { .. }
            | Error::ForgedToken
            | Error::UnsupportedVersion { .. }
            | Error::TokenNotYetValid { .. } => "INVALID_TOKEN",
            Error::TokenExpired => "TOKEN_EXPIRED",
            Error::SecretUnavailable { .. } => "SECRET_UNAVAILABLE",
            Error::Config { .. } => "CONFIG_ERROR",
        }
    }

    /// 프로세스가 토큰을 발급/검증할 수 없는 상태인지 여부
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::SecretUnavailable { .. } | Error::Config { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_share_public_code() {
        let rejections = [
            Error::malformed("too short"),
            Error::ForgedToken,
            Error::UnsupportedVersion { version: 9 },
            Error::TokenNotYetValid { created_at: 1 },
        ];

        for err in &rejections {
            assert_eq!(err.code(), "INVALID_TOKEN");
            assert_eq!(err.status_code(), 401);
            assert!(!err.is_fatal());
        }
    }

    #[test]
    fn test_expired_is_distinct() {
        assert_eq!(Error::TokenExpired.code(), "TOKEN_EXPIRED");
        assert_eq!(Error::TokenExpired.status_code(), 401);
    }

    #[test]
    fn test_secret_unavailable_is_fatal() {
        let err = Error::SecretUnavailable {
            reason: "rng failure".to_string(),
        };
        assert!(err.is_fatal());
        assert_eq!(err.status_code(), 500);
    }
}
