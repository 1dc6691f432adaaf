use super::{try_mask_each, MaskingSecrets, MaskingStrategy};
use crate::errors::{StrategyError, StrategyResult, ValidationErrors};
use crate::registry::StrategyDescriptor;
use crate::schema::{ConfigSchema, FieldSpec, ValidatedConfig};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use std::fmt;
use tracing::error;

pub(super) const KEY: &str = "aes_encrypt";

/// Accepted values of the `mode` field.
pub const AES_MODES: &[&str] = &["GCM"];

/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

pub(super) fn descriptor() -> StrategyDescriptor {
    StrategyDescriptor::new(
        KEY,
        "Masks by encrypting the value using AES",
        ConfigSchema::new()
            .field(FieldSpec::choice("mode", AES_MODES, "Specifies the AES mode").required())
            .field(FieldSpec::text(
                "key",
                "Hex-encoded 128 or 256 bit key; defaults to the process encryption key",
            )),
    )
}

pub(super) fn build(
    config: ValidatedConfig,
    secrets: &MaskingSecrets,
) -> StrategyResult<MaskingStrategy> {
    let config: AesEncryptConfig = config.into_typed()?;
    Ok(MaskingStrategy::AesEncrypt(AesEncryptStrategy::new(
        config, secrets,
    )?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AesMode {
    #[serde(rename = "GCM")]
    Gcm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AesEncryptConfig {
    pub mode: AesMode,
    #[serde(default)]
    pub key: Option<String>,
}

/// Decodes a hex AES key, accepting 128 and 256 bit lengths.
pub fn parse_key(hex_key: &str) -> Result<Vec<u8>, String> {
    let bytes = hex::decode(hex_key.trim()).map_err(|e| format!("key is not valid hex: {e}"))?;
    match bytes.len() {
        16 | 32 => Ok(bytes),
        n => Err(format!(
            "key must be 16 or 32 bytes (32 or 64 hex characters), got {n} bytes"
        )),
    }
}

enum AesCipher {
    Aes128(Box<Aes128Gcm>),
    Aes256(Box<Aes256Gcm>),
}

/// AES-GCM encryption with a fresh random nonce per value.
///
/// Each output is `base64(nonce || ciphertext || tag)`, so the same plaintext
/// encrypts differently every time and remains decryptable with the key.
pub struct AesEncryptStrategy {
    mode: AesMode,
    cipher: AesCipher,
}

impl AesEncryptStrategy {
    /// Builds the cipher. Key problems are reported as validation errors.
    pub fn new(config: AesEncryptConfig, secrets: &MaskingSecrets) -> StrategyResult<Self> {
        let key = match config.key.as_deref() {
            Some(hex_key) => {
                parse_key(hex_key).map_err(|msg| ValidationErrors::single("key", msg))?
            }
            None => secrets.encryption_key().to_vec(),
        };
        Ok(Self {
            mode: config.mode,
            cipher: Self::cipher_for(&key)?,
        })
    }

    fn cipher_for(key: &[u8]) -> StrategyResult<AesCipher> {
        match key.len() {
            16 => Aes128Gcm::new_from_slice(key)
                .map(|c| AesCipher::Aes128(Box::new(c)))
                .map_err(|e| StrategyError::Crypto(e.to_string())),
            32 => Aes256Gcm::new_from_slice(key)
                .map(|c| AesCipher::Aes256(Box::new(c)))
                .map_err(|e| StrategyError::Crypto(e.to_string())),
            n => Err(ValidationErrors::single(
                "key",
                format!("key must be 16 or 32 bytes, got {n} bytes"),
            )
            .into()),
        }
    }

    pub fn mode(&self) -> AesMode {
        self.mode
    }

    pub fn key_bits(&self) -> usize {
        match self.cipher {
            AesCipher::Aes128(_) => 128,
            AesCipher::Aes256(_) => 256,
        }
    }

    pub fn mask(&self, values: &[Option<String>]) -> StrategyResult<Vec<Option<String>>> {
        try_mask_each(values, |value| self.encrypt(value))
    }

    /// Encrypts one value under a newly drawn nonce.
    pub fn encrypt(&self, plaintext: &str) -> StrategyResult<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = match &self.cipher {
            AesCipher::Aes128(c) => c.encrypt(&nonce, plaintext.as_bytes()),
            AesCipher::Aes256(c) => c.encrypt(&nonce, plaintext.as_bytes()),
        }
        .map_err(|_| {
            error!("AES-GCM encryption failed");
            StrategyError::Crypto("AES-GCM encryption failed".to_string())
        })?;

        let mut encoded = Vec::with_capacity(NONCE_LEN + sealed.len());
        encoded.extend_from_slice(&nonce);
        encoded.extend_from_slice(&sealed);
        Ok(STANDARD.encode(encoded))
    }

    /// Recovers the plaintext from an encoded output of [`Self::encrypt`].
    pub fn decrypt(&self, encoded: &str) -> StrategyResult<String> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| StrategyError::Crypto(format!("ciphertext is not valid base64: {e}")))?;
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(StrategyError::Crypto(
                "ciphertext is shorter than nonce and tag".to_string(),
            ));
        }

        let (nonce, sealed) = bytes.split_at(NONCE_LEN);
        let nonce = GenericArray::from_slice(nonce);
        let plain = match &self.cipher {
            AesCipher::Aes128(c) => c.decrypt(nonce, sealed),
            AesCipher::Aes256(c) => c.decrypt(nonce, sealed),
        }
        .map_err(|_| StrategyError::Crypto("ciphertext failed authentication".to_string()))?;

        String::from_utf8(plain)
            .map_err(|_| StrategyError::Crypto("decrypted value is not UTF-8".to_string()))
    }
}

impl fmt::Debug for AesEncryptStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesEncryptStrategy")
            .field("mode", &self.mode)
            .field("key_bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}
