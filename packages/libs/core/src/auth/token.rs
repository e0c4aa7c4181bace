//! 토큰 발급 및 검증
//!
//! 토큰 텍스트는 `encode(MAC) || encode(payload)`입니다. MAC 텍스트 길이가
//! 고정이므로 구분자 없이 [`MAC_TEXT_LEN`] 위치에서 자릅니다.
//!
//! # 검증 순서
//!
//! 1. 길이 < `MAC_TEXT_LEN` → `MalformedToken`
//! 2. MAC / payload 분리
//! 3. payload 텍스트에 대한 MAC 재계산 및 비교 → `ForgedToken`
//! 4. payload 디코딩 → `MalformedToken`
//! 5. 포맷 버전 확인 → `UnsupportedVersion`
//! 6. `created_at - now > MAX_CLOCK_SKEW_MS` → `TokenNotYetValid`
//! 7. `now - created_at >= max_age` → `TokenExpired`
//! 8. 성공 시 `created_at = now`로 새 토큰 발급 (sliding expiration)

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::error::{Error, Result};

use super::clock::{Clock, SystemClock};
use super::codec::{Payload, FORMAT_VERSION};
use super::encoding::{from_text, to_text};
use super::mac::{self, MAC_ITERATIONS, MAC_OUTPUT_BITS, MAC_TEXT_LEN};
use super::secret::{self, Secret, SecretStore};

/// 발급 시각이 현재보다 앞서도 허용하는 한도 (밀리초)
pub const MAX_CLOCK_SKEW_MS: i64 = 60_000;

/// 발급된 세션 토큰
///
/// 불변 값입니다. 갱신은 새 토큰을 만드는 것으로 처리합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionToken {
    subject: Uuid,
    created_at: i64,
    #[serde(rename = "token")]
    text: String,
}

impl SessionToken {
    pub fn subject(&self) -> Uuid {
        self.subject
    }

    /// 발급 시각 (epoch 밀리초)
    pub fn created_at_millis(&self) -> i64 {
        self.created_at
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// 검증 성공 결과
#[derive(Debug, Clone, Serialize)]
pub struct Verified {
    /// 토큰이 주장한 주체
    pub subject: Uuid,

    /// 제출된 토큰의 발급 시각 (epoch 밀리초)
    pub issued_at: i64,

    /// 같은 주체로 `now` 시각에 다시 발급한 토큰
    pub refreshed: SessionToken,
}

/// 검증 실패 사유
///
/// 서버 측 로깅용입니다. 클라이언트에는 [`Rejection::public_code`]만 노출합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    Malformed,
    Forged,
    UnsupportedVersion,
    NotYetValid,
    Expired,
}

impl Rejection {
    /// 에러를 거절 사유로 분류 (토큰 에러가 아니면 `None`)
    pub fn from_error(err: &Error) -> Option<Self> {
        match err {
            Error::MalformedToken { .. } => Some(Rejection::Malformed),
            Error::ForgedToken => Some(Rejection::Forged),
            Error::UnsupportedVersion { .. } => Some(Rejection::UnsupportedVersion),
            Error::TokenNotYetValid { .. } => Some(Rejection::NotYetValid),
            Error::TokenExpired => Some(Rejection::Expired),
            Error::SecretUnavailable { .. } | Error::Config { .. } => None,
        }
    }

    /// 클라이언트용 코드
    ///
    /// 만료만 구분하고 나머지는 모두 `INVALID_TOKEN`입니다.
    pub fn public_code(&self) -> &'static str {
        match self {
            Rejection::Expired => "TOKEN_EXPIRED",
            Rejection::Malformed
            | Rejection::Forged
            | Rejection::UnsupportedVersion
            | Rejection::NotYetValid => "INVALID_TOKEN",
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Rejection::Expired)
    }
}

/// 경계에서의 검증 결과
#[derive(Debug, Clone)]
pub enum Verification {
    Valid(Verified),
    Invalid(Rejection),
}

impl Verification {
    pub fn subject(&self) -> Option<Uuid> {
        match self {
            Verification::Valid(verified) => Some(verified.subject),
            Verification::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid(_))
    }
}

/// 토큰 발급/검증기
pub struct TokenService<C = SystemClock> {
    store: Arc<SecretStore>,
    max_age: Duration,
    clock: C,
}

impl TokenService<SystemClock> {
    /// 시스템 시계를 쓰는 검증기 생성
    pub fn new(store: Arc<SecretStore>, max_age: Duration) -> Self {
        Self {
            store,
            max_age,
            clock: SystemClock,
        }
    }

    /// 설정에서 생성
    ///
    /// 프로세스 전역 시크릿 저장소를 `config.secret_dir`로 설정합니다.
    pub fn from_config(config: &TokenConfig) -> Result<Self> {
        let store = secret::configure(&config.secret_dir)?;
        Ok(Self::new(store, config.max_age))
    }
}

impl<C: Clock> TokenService<C> {
    /// 다른 시계로 교체
    pub fn with_clock<D: Clock>(self, clock: D) -> TokenService<D> {
        TokenService {
            store: self.store,
            max_age: self.max_age,
            clock,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn store(&self) -> &SecretStore {
        &self.store
    }

    /// 시크릿을 미리 로드
    ///
    /// 시작 시점에 호출하면 `SecretUnavailable`로 기동을 중단할 수 있습니다.
    pub fn ensure_secret(&self) -> Result<()> {
        self.store.secret().map(|_| ())
    }

    /// 새 토큰 발급
    pub fn mint(&self, subject: Uuid) -> Result<SessionToken> {
        let secret = self.store.secret()?;
        Ok(seal(Payload::new(subject, self.clock.now_millis()), secret))
    }

    /// 토큰 파싱 + 서명/버전/만료 검증
    ///
    /// 성공하면 같은 주체의 새 토큰을 함께 돌려줍니다.
    pub fn parse_and_verify(&self, text: &str) -> Result<Verified> {
        if text.len() < MAC_TEXT_LEN {
            return Err(Error::malformed(format!(
                "token is {} chars, shorter than the {}-char MAC",
                text.len(),
                MAC_TEXT_LEN
            )));
        }
        if !text.is_char_boundary(MAC_TEXT_LEN) {
            return Err(Error::malformed("token is not URL-safe text"));
        }
        let (mac_part, payload_part) = text.split_at(MAC_TEXT_LEN);

        let secret = self.store.secret()?;
        if !mac::verify(payload_part.as_bytes(), secret.as_bytes(), mac_part) {
            tracing::warn!(token_len = text.len(), "Rejected token with invalid signature");
            return Err(Error::ForgedToken);
        }

        let payload = Payload::decode(&from_text(payload_part)?)?;

        if payload.format_version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion {
                version: payload.format_version,
            });
        }

        let now = self.clock.now_millis();
        if payload.created_at.saturating_sub(now) > MAX_CLOCK_SKEW_MS {
            return Err(Error::TokenNotYetValid {
                created_at: payload.created_at,
            });
        }

        let age = now.saturating_sub(payload.created_at);
        if age >= self.max_age.num_milliseconds() {
            return Err(Error::TokenExpired);
        }

        Ok(Verified {
            subject: payload.subject,
            issued_at: payload.created_at,
            refreshed: seal(Payload::new(payload.subject, now), secret),
        })
    }

    /// 경계용 검증
    ///
    /// 토큰 관련 실패는 모두 `Verification::Invalid`로 모으고 사유는 로그로만 남깁니다.
    /// 시크릿을 얻을 수 없는 경우만 `Err`입니다.
    pub fn authenticate(&self, text: &str) -> Result<Verification> {
        match self.parse_and_verify(text) {
            Ok(verified) => Ok(Verification::Valid(verified)),
            Err(err) => match Rejection::from_error(&err) {
                Some(rejection) => {
                    tracing::debug!(reason = ?rejection, "Token rejected: {}", err);
                    Ok(Verification::Invalid(rejection))
                }
                None => Err(err),
            },
        }
    }
}

fn seal(payload: Payload, secret: &Secret) -> SessionToken {
    let payload_text = to_text(&payload.encode());
    let mac_text = mac::mac(
        payload_text.as_bytes(),
        secret.as_bytes(),
        MAC_ITERATIONS,
        MAC_OUTPUT_BITS,
    );

    SessionToken {
        subject: payload.subject,
        created_at: payload.created_at,
        text: mac_text + &payload_text,
    }
}
