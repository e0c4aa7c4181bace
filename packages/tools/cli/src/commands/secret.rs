//! 시크릿 명령어

use opaq_core::auth::{Clock, SecretOrigin, TokenService};
use serde::Serialize;

use crate::OutputFormat;

#[derive(Debug, Serialize)]
struct InitOutput<'a> {
    path: &'a std::path::Path,
    origin: SecretOrigin,
    persisted: bool,
}

/// 시크릿 로드 또는 생성
pub fn init<C: Clock>(service: &TokenService<C>, format: OutputFormat) -> anyhow::Result<()> {
    service.ensure_secret()?;
    let store = service.store();
    let origin = store
        .origin()
        .ok_or_else(|| anyhow::anyhow!("secret store did not record how the secret was obtained"))?;

    match format {
        OutputFormat::Text => {
            println!("Secret file: {}", store.path().display());
            match origin {
                SecretOrigin::Loaded => {}
                SecretOrigin::Generated => println!("  (generated)"),
                SecretOrigin::Replaced => {
                    println!("  (replaced a corrupt secret file; previously issued tokens are invalid)")
                }
            }
            if !store.is_persisted() {
                println!("  (in-memory only, persisting failed)");
            }
        }
        OutputFormat::Json => {
            let out = InitOutput {
                path: store.path(),
                origin,
                persisted: store.is_persisted(),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opaq_core::auth::{SecretStore, SECRET_LEN};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> TokenService {
        let store = Arc::new(SecretStore::new(dir.path()).unwrap());
        TokenService::new(store, chrono::Duration::hours(1))
    }

    #[test]
    fn test_init_reports_replaced_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("session-token.secret"), b"short").unwrap();

        let service = service(&dir);
        init(&service, OutputFormat::Json).unwrap();

        assert_eq!(service.store().origin(), Some(SecretOrigin::Replaced));
        assert!(service.store().is_persisted());
        assert_eq!(std::fs::read(service.store().path()).unwrap().len(), SECRET_LEN);
    }

    #[test]
    fn test_init_twice_loads_existing() {
        let dir = TempDir::new().unwrap();

        let first = service(&dir);
        init(&first, OutputFormat::Text).unwrap();
        assert_eq!(first.store().origin(), Some(SecretOrigin::Generated));

        let second = service(&dir);
        init(&second, OutputFormat::Text).unwrap();
        assert_eq!(second.store().origin(), Some(SecretOrigin::Loaded));
    }
}
