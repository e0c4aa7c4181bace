//! 시크릿 저장소
//!
//! MAC 키로 쓰이는 20바이트 시크릿을 관리합니다.
//!
//! - 최초 사용 시 파일에서 읽고, 없으면 생성 후 저장
//! - 프로세스 안에서는 한 번만 초기화 (동시 첫 호출도 같은 값을 봄)
//! - 저장 실패 시 경고만 남기고 메모리 시크릿으로 계속 동작
//! - 길이가 맞지 않는 파일은 손상으로 보고 새로 생성 (기존 토큰은 모두 무효)
//! - 파일이 있는데 읽을 수 없으면 `SecretUnavailable`. 기존 파일은 건드리지 않음

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// 시크릿 길이 (바이트)
pub const SECRET_LEN: usize = 20;

/// namespace 디렉터리 아래의 시크릿 파일 이름
pub const SECRET_FILE_NAME: &str = "session-token.secret";

/// MAC 시크릿
///
/// drop 시 메모리를 0으로 지웁니다. `Debug` 출력에는 값이 나오지 않습니다.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret([u8; SECRET_LEN]);

impl Secret {
    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    /// OS 난수로 새 시크릿 생성
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; SECRET_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| Error::SecretUnavailable {
                reason: format!("os rng failed: {}", e),
            })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(..)")
    }
}

/// 시크릿을 어디서 얻었는지
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretOrigin {
    /// 기존 파일에서 읽음
    Loaded,
    /// 파일이 없어서 새로 생성
    Generated,
    /// 길이가 맞지 않는 파일을 새 시크릿으로 교체
    Replaced,
}

#[derive(Debug)]
struct LoadedSecret {
    secret: Secret,
    origin: SecretOrigin,
    persisted: bool,
}

/// 파일 기반 시크릿 저장소
#[derive(Debug)]
pub struct SecretStore {
    path: PathBuf,
    loaded: OnceCell<LoadedSecret>,
}

impl SecretStore {
    /// `namespace` 디렉터리를 쓰는 저장소 생성
    ///
    /// 파일 접근은 첫 [`SecretStore::secret`] 호출까지 미룹니다.
    /// 빈 namespace는 `Config` 에러입니다.
    pub fn new(namespace: impl AsRef<Path>) -> Result<Self> {
        let namespace = namespace.as_ref();
        if namespace.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "secret namespace must not be empty".to_string(),
            });
        }

        Ok(Self {
            path: namespace.join(SECRET_FILE_NAME),
            loaded: OnceCell::new(),
        })
    }

    /// 시크릿 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 시크릿이 이미 메모리에 올라와 있는지 여부
    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// 로드된 시크릿의 출처 (아직 로드 전이면 `None`)
    pub fn origin(&self) -> Option<SecretOrigin> {
        self.loaded.get().map(|loaded| loaded.origin)
    }

    /// 메모리의 시크릿이 파일에 반영돼 있는지 여부
    pub fn is_persisted(&self) -> bool {
        self.loaded.get().is_some_and(|loaded| loaded.persisted)
    }

    /// 시크릿 조회 (없으면 로드 또는 생성)
    ///
    /// 여러 스레드가 동시에 처음 호출해도 초기화는 한 번만 일어납니다.
    /// 나머지 호출자는 초기화가 끝날 때까지 기다린 뒤 같은 값을 받습니다.
    /// 실패하면 캐시하지 않으므로 다음 호출에서 다시 시도합니다.
    pub fn secret(&self) -> Result<&Secret> {
        self.loaded
            .get_or_try_init(|| self.load_or_generate())
            .map(|loaded| &loaded.secret)
    }

    fn load_or_generate(&self) -> Result<LoadedSecret> {
        let origin = match fs::read(&self.path) {
            Ok(mut bytes) => {
                if let Ok(array) = <[u8; SECRET_LEN]>::try_from(bytes.as_slice()) {
                    bytes.zeroize();
                    tracing::info!(path = %self.path.display(), "Loaded session token secret");
                    return Ok(LoadedSecret {
                        secret: Secret::from_bytes(array),
                        origin: SecretOrigin::Loaded,
                        persisted: true,
                    });
                }
                tracing::warn!(
                    path = %self.path.display(),
                    len = bytes.len(),
                    expected = SECRET_LEN,
                    "Secret file has wrong length, regenerating; previously issued tokens become invalid"
                );
                bytes.zeroize();
                SecretOrigin::Replaced
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No secret file, generating a new secret");
                SecretOrigin::Generated
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), "Failed to read secret file: {}", e);
                return Err(Error::SecretUnavailable {
                    reason: format!("cannot read {}: {}", self.path.display(), e),
                });
            }
        };

        let secret = Secret::generate()?;
        let persisted = match self.persist(&secret) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Failed to persist secret, using in-memory secret for this process: {}",
                    e
                );
                false
            }
        };

        Ok(LoadedSecret {
            secret,
            origin,
            persisted,
        })
    }

    /// 임시 파일에 쓰고 fsync 후 rename
    fn persist(&self, secret: &Secret) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(secret.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;

        #[cfg(unix)]
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
                tracing::debug!(dir = %parent.display(), "Failed to sync secret directory: {}", e);
            }
        }

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Process-wide store
// ─────────────────────────────────────────────────────────────────────────────

static GLOBAL_STORE: OnceCell<Arc<SecretStore>> = OnceCell::new();

/// 프로세스 전역 저장소 설정
///
/// 처음 호출한 namespace가 유지됩니다. 이후 다른 namespace로 호출하면
/// 경고를 남기고 기존 저장소를 반환합니다.
pub fn configure(namespace: impl AsRef<Path>) -> Result<Arc<SecretStore>> {
    let namespace = namespace.as_ref();
    let candidate = SecretStore::new(namespace)?;
    let store = GLOBAL_STORE.get_or_init(|| Arc::new(candidate));
    if store.path() != namespace.join(SECRET_FILE_NAME) {
        tracing::warn!(
            active = %store.path().display(),
            requested = %namespace.display(),
            "Secret store already configured, ignoring new namespace"
        );
    }
    Ok(Arc::clone(store))
}

/// 프로세스 전역 저장소
///
/// [`configure`] 전에 호출하면 `SecretUnavailable`.
pub fn global() -> Result<Arc<SecretStore>> {
    GLOBAL_STORE.get().cloned().ok_or_else(|| Error::SecretUnavailable {
        reason: "secret store used before configure()".to_string(),
    })
}
