//! opaq-core: 서명된 불투명 세션 토큰 라이브러리
//!
//! 이 크레이트는 "이 요청자는 사용자 U이며 시각 T 기준으로 유효하다"는
//! 주장을 담은 짧은 토큰을 발급하고, 네트워크 왕복이나 공유 DB 없이
//! 검증하는 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `auth`: 시크릿 저장소, 페이로드 코덱, MAC, 텍스트 인코딩, 토큰 검증기
//! - `config`: 환경변수 기반 설정
//! - `error`: 공통 에러 타입

pub mod auth;
pub mod config;
pub mod error;

pub use config::TokenConfig;
pub use error::{Error, Result};
