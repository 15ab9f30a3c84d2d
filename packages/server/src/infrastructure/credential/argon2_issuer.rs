//! Argon2 を使った CredentialIssuer 実装
//!
//! ルームコードとパスワードは `rand` で生成し、パスワードは Argon2 の PHC 文字列として
//! のみ保持します。平文は作成時に一度だけ作成者へ返されます。

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash as PhcHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use rand::{Rng, distributions::Alphanumeric};

use crate::domain::{
    CredentialError, CredentialIssuer, PasswordHash, RoomCode, value_object::ROOM_CODE_LENGTH,
};

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PASSWORD_LENGTH: usize = 8;

#[derive(Default)]
pub struct Argon2CredentialIssuer {
    argon2: Argon2<'static>,
}

impl Argon2CredentialIssuer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialIssuer for Argon2CredentialIssuer {
    fn generate_room_code(&self) -> RoomCode {
        let mut rng = rand::thread_rng();
        let code: String = (0..ROOM_CODE_LENGTH)
            .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        // The alphabet and length always satisfy RoomCode's rules.
        RoomCode::new(code.clone()).unwrap_or_else(|_| unreachable!("invalid room code {code}"))
    }

    fn generate_password(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(PASSWORD_LENGTH)
            .map(char::from)
            .collect()
    }

    fn hash_password(&self, plain: &str) -> Result<PasswordHash, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| PasswordHash::new(hash.to_string()))
            .map_err(|e| CredentialError(e.to_string()))
    }

    fn verify_password(&self, plain: &str, hash: &PasswordHash) -> bool {
        let Ok(parsed) = PhcHash::new(hash.as_str()) else {
            tracing::warn!("Stored room password hash is not a valid PHC string");
            return false;
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_room_code_is_short_uppercase_alphanumeric() {
        // テスト項目: 生成されたルームコードは 6 文字の大文字英数字
        // given (前提条件):
        let issuer = Argon2CredentialIssuer::new();

        // when (操作):
        let code = issuer.generate_room_code();

        // then (期待する結果):
        assert_eq!(code.as_str().len(), ROOM_CODE_LENGTH);
        assert!(
            code.as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generated_password_is_alphanumeric() {
        // テスト項目: 生成されたパスワードは英数字のみ
        // given (前提条件):
        let issuer = Argon2CredentialIssuer::new();

        // when (操作):
        let password = issuer.generate_password();

        // then (期待する結果):
        assert_eq!(password.len(), PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_hash_and_verify_password() {
        // テスト項目: ハッシュ化したパスワードは正しい平文でのみ検証に成功する
        // given (前提条件):
        let issuer = Argon2CredentialIssuer::new();
        let hash = issuer.hash_password("s3cretPW").unwrap();

        // when (操作):
        let correct = issuer.verify_password("s3cretPW", &hash);
        let wrong = issuer.verify_password("s3cretPw", &hash);

        // then (期待する結果):
        assert!(correct);
        assert!(!wrong);
        assert!(!hash.as_str().contains("s3cretPW"));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        // テスト項目: PHC 形式でないハッシュに対する検証は失敗する
        // given (前提条件):
        let issuer = Argon2CredentialIssuer::new();

        // when (操作):
        let result = issuer.verify_password("anything", &PasswordHash::new("plain".to_string()));

        // then (期待する結果):
        assert!(!result);
    }
}
