//! 시계 추상화
//!
//! 만료 검사를 테스트/도구에서 고정 시각으로 돌릴 수 있게 합니다.

use chrono::{DateTime, Utc};

/// 현재 시각 공급자
pub trait Clock: Send + Sync {
    /// 현재 시각 (epoch 기준 밀리초)
    fn now_millis(&self) -> i64;
}

/// 시스템 시계
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// 고정 시각 시계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl FixedClock {
    pub fn at(time: DateTime<Utc>) -> Self {
        Self(time.timestamp_millis())
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}
