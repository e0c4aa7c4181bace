//! 키 기반 해시 인증 (MAC)
//!
//! 시크릿을 키로, 메시지를 salt로 하는 PBKDF2(HMAC-SHA512)입니다.
//! 반복 횟수는 유출된 토큰에 대한 오프라인 brute-force 비용을 올리기 위한 것입니다.
//!
//! 반복 횟수와 출력 길이는 포맷 버전 1의 상수입니다.
//! 바꾸면 이미 발급된 모든 토큰이 검증 불가가 됩니다.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::encoding::{encoded_len, to_text};

/// 포맷 버전 1의 반복 횟수
pub const MAC_ITERATIONS: u32 = 2048;

/// 포맷 버전 1의 MAC 출력 길이 (bit)
pub const MAC_OUTPUT_BITS: usize = 512;

/// 인코딩된 MAC 텍스트 길이: `ceil(output_bits / 8 / 3) * 4`
pub const MAC_TEXT_LEN: usize = mac_text_len(MAC_OUTPUT_BITS);

/// 출력 길이(bit)에 대한 MAC 텍스트 길이
pub const fn mac_text_len(output_bits: usize) -> usize {
    encoded_len(output_bits / 8)
}

/// `message`에 대한 MAC을 계산해 URL-safe 텍스트로 반환
///
/// `output_bits`는 8의 배수여야 합니다.
pub fn mac(message: &[u8], secret: &[u8], iterations: u32, output_bits: usize) -> String {
    debug_assert!(output_bits % 8 == 0, "output_bits must be byte aligned");
    debug_assert!(iterations > 0, "iterations must be positive");

    let mut derived = vec![0u8; output_bits / 8];
    pbkdf2_hmac::<Sha512>(secret, message, iterations, &mut derived);
    to_text(&derived)
}

/// 재계산한 MAC과 `supplied`를 상수 시간으로 비교
pub fn verify(message: &[u8], secret: &[u8], supplied: &str) -> bool {
    let expected = mac(message, secret, MAC_ITERATIONS, MAC_OUTPUT_BITS);
    expected.as_bytes().ct_eq(supplied.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::encoding::from_text;

    #[test]
    fn test_mac_text_len() {
        // 64 bytes → 22 groups of 3 → 88 chars
        assert_eq!(MAC_TEXT_LEN, 88);
        assert_eq!(mac_text_len(256), 44);
        assert_eq!(mac_text_len(8), 4);
    }

    #[test]
    fn test_mac_has_fixed_length() {
        for message in [&b""[..], b"a", b"some longer payload text"] {
            let tag = mac(message, b"secret", MAC_ITERATIONS, MAC_OUTPUT_BITS);
            assert_eq!(tag.len(), MAC_TEXT_LEN);
        }
    }

    #[test]
    fn test_pbkdf2_sha512_vector() {
        // published PBKDF2-HMAC-SHA512 vector
        // P = "password" (secret), S = "salt" (message), dkLen = 64
        let c1 = from_text(&mac(b"salt", b"password", 1, 512)).unwrap();
        assert_eq!(&c1[..8], &[0x86, 0x7f, 0x70, 0xcf, 0x1a, 0xde, 0x02, 0xcf]);

        let c2 = from_text(&mac(b"salt", b"password", 2, 512)).unwrap();
        assert_eq!(&c2[..8], &[0xe1, 0xd9, 0xc1, 0x6a, 0xa6, 0x81, 0x70, 0x8a]);
    }

    #[test]
    fn test_multi_block_output() {
        let long = from_text(&mac(b"m", b"k", 3, 640)).unwrap();
        let short = from_text(&mac(b"m", b"k", 3, 512)).unwrap();

        assert_eq!(long.len(), 80);
        assert_eq!(&long[..64], &short[..]);
        assert_ne!(&long[64..], &[0u8; 16]);
    }

    #[test]
    fn test_verify() {
        let secret = [7u8; 20];
        let tag = mac(b"payload", &secret, MAC_ITERATIONS, MAC_OUTPUT_BITS);

        assert!(verify(b"payload", &secret, &tag));
        assert!(!verify(b"payload!", &secret, &tag));
        assert!(!verify(b"payload", &[8u8; 20], &tag));
        assert!(!verify(b"payload", &secret, &tag[..MAC_TEXT_LEN - 1]));
    }

    #[test]
    fn test_iterations_change_output() {
        let a = mac(b"m", b"k", 1, MAC_OUTPUT_BITS);
        let b = mac(b"m", b"k", 2, MAC_OUTPUT_BITS);
        assert_ne!(a, b);
    }
}
