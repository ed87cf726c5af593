//! Secret material helpers: a redacting string wrapper and opaque value generation.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
// self
use crate::_prelude::*;

/// Redacted secret wrapper keeping sensitive material out of logs.
///
/// Used for client secrets, provider-issued tokens, and the locally configured
/// signing/encryption keys.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);
impl SecretString {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Checks whether the wrapped value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for SecretString {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for SecretString {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SecretString").field(&"<redacted>").finish()
	}
}
impl Display for SecretString {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Generates `len` random bytes rendered as unpadded URL-safe base64.
///
/// Shared by state values, PKCE verifiers, nonces, session codes, and refresh
/// tokens; 32 input bytes yield at least 256 bits of entropy.
pub fn random_token(len: usize) -> String {
	let mut bytes = vec![0_u8; len];

	rand::rng().fill(bytes.as_mut_slice());

	URL_SAFE_NO_PAD.encode(bytes)
}
