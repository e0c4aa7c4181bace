//! 토큰 명령어

use opaq_core::auth::{Clock, TokenService, Verification, Verified};
use serde::Serialize;
use uuid::Uuid;

use crate::OutputFormat;

#[derive(Debug, Serialize)]
struct MintOutput<'a> {
    subject: Uuid,
    created_at: i64,
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifiedOutput<'a> {
    valid: bool,
    #[serde(flatten)]
    verified: &'a Verified,
}

#[derive(Debug, Serialize)]
struct RejectedOutput {
    valid: bool,
    code: &'static str,
}

pub fn mint<C: Clock>(
    service: &TokenService<C>,
    subject: Uuid,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let token = service.mint(subject)?;

    match format {
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => {
            let out = MintOutput {
                subject: token.subject(),
                created_at: token.created_at_millis(),
                token: token.as_str(),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

pub fn verify<C: Clock>(
    service: &TokenService<C>,
    token: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rejection = match service.authenticate(token.trim())? {
        Verification::Valid(verified) => {
            match format {
                OutputFormat::Text => {
                    println!("Valid token");
                    println!("  subject:   {}", verified.subject);
                    println!("  issued at: {}", format_millis(verified.issued_at));
                    println!("  refreshed: {}", verified.refreshed);
                }
                OutputFormat::Json => {
                    let out = VerifiedOutput {
                        valid: true,
                        verified: &verified,
                    };
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
            return Ok(());
        }
        Verification::Invalid(rejection) => rejection,
    };

    if let OutputFormat::Json = format {
        let out = RejectedOutput {
            valid: false,
            code: rejection.public_code(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    }
    anyhow::bail!("token rejected: {}", rejection.public_code())
}

fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| format!("{}ms", millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opaq_core::auth::{FixedClock, SecretStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_verified_output_is_snake_case() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SecretStore::new(dir.path()).unwrap());
        let max_age = chrono::Duration::hours(1);

        let token = TokenService::new(Arc::clone(&store), max_age)
            .with_clock(FixedClock(5))
            .mint(Uuid::nil())
            .unwrap();
        let verified = TokenService::new(store, max_age)
            .with_clock(FixedClock(9))
            .parse_and_verify(token.as_str())
            .unwrap();

        let json = serde_json::to_value(VerifiedOutput {
            valid: true,
            verified: &verified,
        })
        .unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["subject"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["issued_at"], 5);
        assert_eq!(json["refreshed"]["created_at"], 9);
        assert!(json.get("issuedAt").is_none());
    }
}
