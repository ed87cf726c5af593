//! Authenticated at-rest encryption for provider tokens.

// crates.io
use aes_gcm::{
	Aes256Gcm, Key, Nonce,
	aead::{Aead, KeyInit},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::Rng;
// self
use crate::{_prelude::*, secret::SecretString};

const KEY_BYTES: usize = 32;
const NONCE_BYTES: usize = 12;

/// AES-256-GCM sealer for provider access/refresh tokens.
///
/// The key is derived from the configured secret, truncated or zero-padded to 32 bytes.
/// Every call draws a fresh 96-bit nonce; the stored blob is the standard-base64 encoding
/// of `nonce || ciphertext || tag`, so decryption needs nothing beyond the blob itself.
#[derive(Clone)]
pub struct TokenEncryptionService {
	cipher: Aes256Gcm,
}
impl TokenEncryptionService {
	/// Derives the sealing key from the configured secret.
	pub fn new(secret: &SecretString) -> Self {
		let mut key = [0_u8; KEY_BYTES];
		let bytes = secret.expose().as_bytes();
		let len = bytes.len().min(KEY_BYTES);

		key[..len].copy_from_slice(&bytes[..len]);

		Self { cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)) }
	}

	/// Seals a plaintext token under a fresh nonce.
	pub fn encrypt(&self, plaintext: &str) -> Result<String> {
		let mut nonce_bytes = [0_u8; NONCE_BYTES];

		rand::rng().fill(nonce_bytes.as_mut_slice());

		let nonce = Nonce::from_slice(&nonce_bytes);
		let ciphertext =
			self.cipher.encrypt(nonce, plaintext.as_bytes()).map_err(|_| Error::EncryptionFailed)?;
		let mut blob = Vec::with_capacity(NONCE_BYTES + ciphertext.len());

		blob.extend_from_slice(&nonce_bytes);
		blob.extend_from_slice(&ciphertext);

		Ok(STANDARD.encode(blob))
	}

	/// Seals an optional token, passing `None` through untouched.
	pub fn encrypt_opt(&self, value: Option<&str>) -> Result<Option<String>> {
		value.map(|plaintext| self.encrypt(plaintext)).transpose()
	}

	/// Opens a blob produced by [`Self::encrypt`]; the first 12 bytes are the nonce.
	pub fn decrypt(&self, blob: &str) -> Result<String> {
		let bytes = STANDARD.decode(blob).map_err(|_| Error::EncryptionFailed)?;

		if bytes.len() <= NONCE_BYTES {
			return Err(Error::EncryptionFailed);
		}

		let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_BYTES);
		let nonce = Nonce::from_slice(nonce_bytes);
		let plaintext =
			self.cipher.decrypt(nonce, ciphertext).map_err(|_| Error::EncryptionFailed)?;

		String::from_utf8(plaintext).map_err(|_| Error::EncryptionFailed)
	}
}
impl Debug for TokenEncryptionService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEncryptionService").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn service() -> TokenEncryptionService {
		TokenEncryptionService::new(&SecretString::new("unit-test-encryption-secret"))
	}

	#[test]
	fn round_trip_recovers_the_plaintext() {
		let service = service();
		let blob = service.encrypt("provider-access-token").expect("Sealing should succeed.");
		let plaintext = service.decrypt(&blob).expect("Opening should succeed.");

		assert_eq!(plaintext, "provider-access-token");
	}

	#[test]
	fn fresh_nonces_make_ciphertexts_differ() {
		let service = service();
		let first = service.encrypt("same-plaintext").expect("First sealing should succeed.");
		let second = service.encrypt("same-plaintext").expect("Second sealing should succeed.");

		assert_ne!(first, second);
	}

	#[test]
	fn optional_sealing_passes_none_through() {
		let service = service();

		assert_eq!(service.encrypt_opt(None).expect("None should pass through."), None);
		assert!(
			service.encrypt_opt(Some("value")).expect("Some should seal.").is_some()
		);
	}

	#[test]
	fn tampered_blob_is_rejected() {
		let service = service();
		let blob = service.encrypt("token").expect("Sealing should succeed.");
		let mut bytes = STANDARD.decode(&blob).expect("Blob should be valid base64.");
		let last = bytes.len() - 1;

		bytes[last] ^= 0x01;

		let tampered = STANDARD.encode(bytes);

		assert!(matches!(service.decrypt(&tampered), Err(Error::EncryptionFailed)));
	}

	#[test]
	fn truncated_blob_is_rejected() {
		let service = service();

		assert!(matches!(service.decrypt("AAAA"), Err(Error::EncryptionFailed)));
		assert!(matches!(service.decrypt("not base64 !!!"), Err(Error::EncryptionFailed)));
	}

	#[test]
	fn keys_longer_than_32_bytes_are_truncated_consistently() {
		let long = TokenEncryptionService::new(&SecretString::new(
			"0123456789abcdef0123456789abcdef-and-then-some-extra-material",
		));
		let truncated =
			TokenEncryptionService::new(&SecretString::new("0123456789abcdef0123456789abcdef"));
		let blob = long.encrypt("token").expect("Sealing should succeed.");

		assert_eq!(
			truncated.decrypt(&blob).expect("Truncated key should open the blob."),
			"token"
		);
	}
}
