//! URL-safe 텍스트 인코딩
//!
//! base64url 알파벳(`A-Z a-z 0-9 - _`)에 정규 `=` 패딩을 사용합니다.
//! 패딩 덕분에 n바이트의 인코딩 길이는 항상 `ceil(n / 3) * 4`입니다.

use base64::{engine::general_purpose, Engine as _};

use crate::error::{Error, Result};

/// 바이트열 → URL-safe 텍스트
pub fn to_text(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE.encode(bytes)
}

/// URL-safe 텍스트 → 바이트열
///
/// 알파벳 밖의 문자나 잘못된 패딩은 `MalformedToken`.
pub fn from_text(text: &str) -> Result<Vec<u8>> {
    general_purpose::URL_SAFE
        .decode(text)
        .map_err(|e| Error::malformed(format!("invalid base64url: {}", e)))
}

/// n바이트를 인코딩했을 때의 텍스트 길이
pub const fn encoded_len(byte_len: usize) -> usize {
    byte_len.div_ceil(3) * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_safe_alphabet() {
        // 0xfb 0xff → 표준 알파벳이라면 '+', '/'가 나오는 값
        let text = to_text(&[0xfb, 0xff, 0xbf]);
        assert_eq!(text, "-_-_");
        assert_eq!(from_text(&text).unwrap(), vec![0xfb, 0xff, 0xbf]);
    }

    #[test]
    fn test_encoded_len_matches_engine() {
        for n in 0..70 {
            let bytes = vec![0xa5u8; n];
            assert_eq!(to_text(&bytes).len(), encoded_len(n), "n = {}", n);
        }
    }

    #[test]
    fn test_rejects_standard_alphabet() {
        assert!(matches!(from_text("+/+/"), Err(Error::MalformedToken { .. })));
    }

    #[test]
    fn test_rejects_missing_padding() {
        let text = to_text(&[1, 2, 3, 4]);
        assert!(text.ends_with("=="));
        let unpadded = text.trim_end_matches('=');
        assert!(from_text(unpadded).is_err());
    }
}
