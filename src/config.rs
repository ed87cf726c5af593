//! Global social-login settings shared by stores, issuers, and flows.

// self
use crate::{_prelude::*, secret::SecretString};

/// Process-wide social-login configuration.
///
/// Per-provider settings live in [`crate::provider::ProviderConfig`]; this struct carries
/// everything that spans providers: TTLs, signing/encryption secrets, and the redirect
/// targets the HTTP collaborator needs when rendering responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLoginConfig {
	/// Lifetime of an authorization state entry.
	pub state_ttl: Duration,
	/// Lifetime of a one-time session code; falls back to [`Self::state_ttl`] when unset.
	pub session_ttl: Option<Duration>,
	/// Lifetime of a minted local access token.
	pub access_token_ttl: Duration,
	/// Issuer claim stamped into local access tokens.
	pub issuer: String,
	/// Base URL the HTTP layer prepends to provider callback paths.
	pub redirect_base_url: Option<String>,
	/// Frontend URL that receives the one-time session code after a callback.
	pub frontend_redirect_url: Option<String>,
	/// Secret the at-rest token encryption key is derived from.
	pub encryption_secret: SecretString,
	/// Shared secret local access tokens are signed with.
	pub jwt_secret: SecretString,
}
impl SocialLoginConfig {
	/// Default lifetime applied to states, session codes, and access tokens.
	pub const DEFAULT_TTL: Duration = Duration::minutes(5);
	/// Default issuer claim value.
	pub const DEFAULT_ISSUER: &'static str = "auth-service";

	/// Effective session-code lifetime: `session_ttl`, else `state_ttl`, else five minutes
	/// (the `state_ttl` default).
	pub fn session_ttl(&self) -> Duration {
		self.session_ttl.unwrap_or(self.state_ttl)
	}
}
impl Default for SocialLoginConfig {
	fn default() -> Self {
		Self {
			state_ttl: Self::DEFAULT_TTL,
			session_ttl: None,
			access_token_ttl: Self::DEFAULT_TTL,
			issuer: Self::DEFAULT_ISSUER.into(),
			redirect_base_url: None,
			frontend_redirect_url: None,
			encryption_secret: SecretString::new(""),
			jwt_secret: SecretString::new(""),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn session_ttl_falls_back_to_state_ttl() {
		let mut config = SocialLoginConfig { state_ttl: Duration::minutes(10), ..Default::default() };

		assert_eq!(config.session_ttl(), Duration::minutes(10));

		config.session_ttl = Some(Duration::minutes(2));

		assert_eq!(config.session_ttl(), Duration::minutes(2));
	}

	#[test]
	fn defaults_match_documented_values() {
		let config = SocialLoginConfig::default();

		assert_eq!(config.state_ttl, Duration::minutes(5));
		assert_eq!(config.access_token_ttl, Duration::minutes(5));
		assert_eq!(config.issuer, "auth-service");
	}
}
