//! 토큰 페이로드 바이너리 코덱
//!
//! 고정 길이(25바이트) 레이아웃입니다. 모든 정수는 big-endian.
//!
//! ```text
//! | version: u8 | created_at: i64 | subject_hi: u64 | subject_lo: u64 |
//! |      1      |        8        |        8        |        8        |
//! ```

use uuid::Uuid;

use crate::error::{Error, Result};

/// 이 구현이 이해하는 유일한 포맷 버전
pub const FORMAT_VERSION: u8 = 1;

/// 인코딩된 페이로드 길이
pub const PAYLOAD_LEN: usize = 1 + 8 + 8 + 8;

/// 토큰 페이로드
///
/// MAC으로 보호되는 (버전, 발급 시각, 주체) 묶음입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload {
    /// 바이너리 레이아웃 버전
    pub format_version: u8,

    /// 발급(또는 갱신) 시각, epoch 기준 밀리초
    pub created_at: i64,

    /// 토큰이 주장하는 주체
    pub subject: Uuid,
}

impl Payload {
    /// 현재 포맷 버전으로 새 페이로드 생성
    pub fn new(subject: Uuid, created_at: i64) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            created_at,
            subject,
        }
    }

    pub fn encode(&self) -> [u8; PAYLOAD_LEN] {
        let (hi, lo) = self.subject.as_u64_pair();

        let mut out = [0u8; PAYLOAD_LEN];
        out[0] = self.format_version;
        out[1..9].copy_from_slice(&self.created_at.to_be_bytes());
        out[9..17].copy_from_slice(&hi.to_be_bytes());
        out[17..25].copy_from_slice(&lo.to_be_bytes());
        out
    }

    /// 바이트열에서 페이로드 복원
    ///
    /// 길이가 정확히 [`PAYLOAD_LEN`]이 아니면 `MalformedToken`.
    /// 버전 검사는 하지 않습니다 (검증기의 몫).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < PAYLOAD_LEN {
            return Err(Error::malformed(format!(
                "payload is {} bytes, expected {}",
                bytes.len(),
                PAYLOAD_LEN
            )));
        }
        if bytes.len() > PAYLOAD_LEN {
            return Err(Error::malformed(format!(
                "{} trailing bytes after payload",
                bytes.len() - PAYLOAD_LEN
            )));
        }

        let created_at = i64::from_be_bytes(read_8(&bytes[1..9]));
        let hi = u64::from_be_bytes(read_8(&bytes[9..17]));
        let lo = u64::from_be_bytes(read_8(&bytes[17..25]));

        Ok(Self {
            format_version: bytes[0],
            created_at,
            subject: Uuid::from_u64_pair(hi, lo),
        })
    }
}

fn read_8(slice: &[u8]) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(slice);
    buf
}
