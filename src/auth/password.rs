//! PBKDF2 password records.
//!
//! Record format: `PBKDF2$<digest>$<iterations>$<salt>$<hash>`, where
//! `digest` is `sha256` or `sha512` and `salt`/`hash` are standard base64.

use std::str::FromStr;

use authplug_error::PasswordError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::{Sha256, Sha512};

/// Тег, с которого начинается каждая запись.
pub const RECORD_TAG: &str = "PBKDF2";
const SEPARATOR: char = '$';

/// Хеш-функция, используемая в HMAC внутри PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digest {
    Sha256,
    Sha512,
}

/// Параметры генерации новой записи.
#[derive(Debug, Clone)]
pub struct HashParams {
    pub digest: Digest,
    pub iterations: u32,
    pub salt_len: usize,
    pub key_len: usize,
}

/// Разобранная запись пароля.
struct Record {
    digest: Digest,
    iterations: u32,
    salt: Vec<u8>,
    expected: Vec<u8>,
}

impl Digest {
    pub fn as_str(&self) -> &'static str {
        match self {
            Digest::Sha256 => "sha256",
            Digest::Sha512 => "sha512",
        }
    }

    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        out: &mut [u8],
    ) {
        match self {
            Digest::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, iterations, out),
            Digest::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, iterations, out),
        }
    }
}

impl FromStr for Digest {
    type Err = PasswordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Digest::Sha256),
            "sha512" => Ok(Digest::Sha512),
            other => Err(PasswordError::InvalidParams(format!(
                "unsupported digest `{other}`"
            ))),
        }
    }
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            digest: Digest::Sha256,
            iterations: 901,
            salt_len: 12,
            key_len: 24,
        }
    }
}

impl Record {
    /// Разбирает запись. Любое отклонение от формата — `None`.
    fn parse(stored: &str) -> Option<Self> {
        let fields: Vec<&str> = stored.split(SEPARATOR).collect();
        if fields.len() != 5 || fields[0] != RECORD_TAG {
            return None;
        }

        let digest = fields[1].parse::<Digest>().ok()?;
        let iterations = fields[2].parse::<u32>().ok().filter(|n| *n > 0)?;
        let salt = BASE64.decode(fields[3]).ok()?;
        let expected = BASE64.decode(fields[4]).ok()?;
        if expected.is_empty() {
            return None;
        }

        Some(Self {
            digest,
            iterations,
            salt,
            expected,
        })
    }
}

/// Проверяет пароль против сохранённой записи.
///
/// Испорченная запись (неверное число полей, неизвестный digest,
/// недекодируемая соль) считается несовпадением.
pub fn verify(
    password: &str,
    stored: &str,
) -> bool {
    let Some(record) = Record::parse(stored) else {
        return false;
    };

    let mut derived = vec![0u8; record.expected.len()];
    record.digest.derive(
        password.as_bytes(),
        &record.salt,
        record.iterations,
        &mut derived,
    );

    constant_time_eq(&derived, &record.expected)
}

/// Генерирует новую запись со случайной солью.
pub fn hash_password(
    password: &str,
    params: &HashParams,
) -> Result<String, PasswordError> {
    if params.iterations == 0 {
        return Err(PasswordError::InvalidParams(
            "iterations must be positive".into(),
        ));
    }
    if params.salt_len == 0 || params.key_len == 0 {
        return Err(PasswordError::InvalidParams(
            "salt and key length must be positive".into(),
        ));
    }

    let mut salt = vec![0u8; params.salt_len];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(hash_with_salt(password, &salt, params))
}

fn hash_with_salt(
    password: &str,
    salt: &[u8],
    params: &HashParams,
) -> String {
    let mut key = vec![0u8; params.key_len];
    params
        .digest
        .derive(password.as_bytes(), salt, params.iterations, &mut key);

    format!(
        "{RECORD_TAG}${}${}${}${}",
        params.digest.as_str(),
        params.iterations,
        BASE64.encode(salt),
        BASE64.encode(&key)
    )
}

/// Сравнение за время, не зависящее от позиции первого отличия.
fn constant_time_eq(
    a: &[u8],
    b: &[u8],
) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}
