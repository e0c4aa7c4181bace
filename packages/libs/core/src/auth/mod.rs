//! 세션 토큰 발급/검증
//!
//! # 구성 요소
//!
//! - `secret`: MAC 시크릿 저장소 (파일 영속화, 1회 초기화)
//! - `codec`: 페이로드 ↔ 25바이트 고정 레이아웃
//! - `mac`: PBKDF2(HMAC-SHA512) 기반 MAC
//! - `encoding`: URL-safe base64 텍스트
//! - `token`: 발급, 검증, sliding expiration
//!
//! # 데이터 흐름
//!
//! 발급: subject → payload bytes → text → MAC → `MAC || payload`
//! 검증: text → MAC 확인 → payload 디코딩 → 버전/발급 시각/만료 확인 → subject

pub mod clock;
pub mod codec;
pub mod encoding;
pub mod mac;
pub mod secret;
mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{Payload, FORMAT_VERSION, PAYLOAD_LEN};
pub use secret::{Secret, SecretOrigin, SecretStore, SECRET_LEN};
pub use token::{
    Rejection, SessionToken, TokenService, Verification, Verified, MAX_CLOCK_SKEW_MS,
};
