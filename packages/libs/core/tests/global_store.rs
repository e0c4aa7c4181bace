//! 프로세스 전역 시크릿 저장소 흐름
//!
//! 전역 상태를 쓰므로 별도 테스트 바이너리에 하나의 테스트로 둡니다.

use chrono::Duration;
use opaq_core::auth::{secret, TokenService, Verification};
use opaq_core::{Error, TokenConfig};
use tempfile::TempDir;
use uuid::Uuid;

#[test]
fn global_store_lifecycle() {
    // 설정 전 사용은 즉시 실패
    let err = secret::global().unwrap_err();
    assert!(matches!(err, Error::SecretUnavailable { .. }));

    let dir = TempDir::new().unwrap();
    let config = TokenConfig::new(dir.path()).with_max_age(Duration::minutes(5));
    let service = TokenService::from_config(&config).unwrap();
    service.ensure_secret().unwrap();

    let global = secret::global().unwrap();
    assert_eq!(global.path(), service.store().path());
    assert!(global.is_loaded());

    // 다른 namespace로 재설정해도 기존 저장소 유지
    let other = TempDir::new().unwrap();
    let again = secret::configure(other.path()).unwrap();
    assert_eq!(again.path(), service.store().path());

    let subject = Uuid::new_v4();
    let token = service.mint(subject).unwrap();
    match service.authenticate(token.as_str()).unwrap() {
        Verification::Valid(verified) => assert_eq!(verified.subject, subject),
        Verification::Invalid(rejection) => panic!("Expected Valid, got {:?}", rejection),
    }
}
