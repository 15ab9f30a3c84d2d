//! パスワードのハッシュ化と検証
//!
//! Argon2 は意図的に重い処理なので、非同期ランタイムのワーカースレッドでは実行せず
//! `spawn_blocking` のスレッドプールに回します。

use std::sync::Arc;

use tokio::task;

use crate::domain::{CredentialIssuer, PasswordHash};

use super::error::RoomError;

pub(super) async fn hash_password(
    credentials: &Arc<dyn CredentialIssuer>,
    plain: String,
) -> Result<PasswordHash, RoomError> {
    let hashed = run_blocking(credentials, move |issuer| issuer.hash_password(&plain)).await?;
    Ok(hashed?)
}

pub(super) async fn verify_password(
    credentials: &Arc<dyn CredentialIssuer>,
    plain: String,
    hash: PasswordHash,
) -> Result<bool, RoomError> {
    run_blocking(credentials, move |issuer| issuer.verify_password(&plain, &hash)).await
}

async fn run_blocking<F, R>(credentials: &Arc<dyn CredentialIssuer>, f: F) -> Result<R, RoomError>
where
    F: FnOnce(&dyn CredentialIssuer) -> R + Send + 'static,
    R: Send + 'static,
{
    let issuer = Arc::clone(credentials);
    task::spawn_blocking(move || f(issuer.as_ref()))
        .await
        .map_err(|e| RoomError::Internal(format!("credential task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{Mutex as StdMutex, mpsc},
        time::Duration,
    };

    use crate::domain::{CredentialError, RoomCode};

    /// Verification waits until the test releases it from an async task.
    struct GatedIssuer {
        release: StdMutex<mpsc::Receiver<()>>,
    }

    impl CredentialIssuer for GatedIssuer {
        fn generate_room_code(&self) -> RoomCode {
            RoomCode::new("GATE01".to_string()).unwrap()
        }

        fn generate_password(&self) -> String {
            "gated".to_string()
        }

        fn hash_password(&self, plain: &str) -> Result<PasswordHash, CredentialError> {
            Ok(PasswordHash::new(plain.to_string()))
        }

        fn verify_password(&self, _plain: &str, _hash: &PasswordHash) -> bool {
            self.release
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(2))
                .is_ok()
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_verify_does_not_block_runtime_thread() {
        // テスト項目: 検証中もランタイムのスレッドは他のタスクを実行できる
        // given (前提条件): ランタイムのスレッドは 1 本だけ
        let (tx, rx) = mpsc::channel();
        let credentials: Arc<dyn CredentialIssuer> = Arc::new(GatedIssuer {
            release: StdMutex::new(rx),
        });
        let releaser = tokio::spawn(async move {
            let _ = tx.send(());
        });

        // when (操作): 検証がランタイムのスレッドで動くと releaser が実行されずタイムアウトする
        let verified = verify_password(
            &credentials,
            "pw".to_string(),
            PasswordHash::new("pw".to_string()),
        )
        .await;

        // then (期待する結果):
        releaser.await.unwrap();
        assert_eq!(verified, Ok(true));
    }

    #[tokio::test]
    async fn test_hash_password_runs_issuer() {
        // テスト項目: ハッシュ化は CredentialIssuer の結果をそのまま返す
        // given (前提条件):
        let (_tx, rx) = mpsc::channel();
        let credentials: Arc<dyn CredentialIssuer> = Arc::new(GatedIssuer {
            release: StdMutex::new(rx),
        });

        // when (操作):
        let hash = hash_password(&credentials, "secret".to_string()).await;

        // then (期待する結果):
        assert_eq!(hash.map(|h| h.as_str().to_string()), Ok("secret".to_string()));
    }
}
