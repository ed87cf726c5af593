//! Per-provider OAuth configuration and the case-insensitive registry resolving it.
//!
//! Provider behavior varies by configuration, not by subtype: a [`ProviderConfig`] table
//! drives every flow, so adding a provider is a config change rather than a code change.

/// Case-insensitive provider lookup.
pub mod registry;

pub use registry::*;

// self
use crate::{_prelude::*, secret::SecretString};

/// Immutable per-provider OAuth settings consumed by flows.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// Provider name; registry keys are the case-folded form.
	pub name: String,
	/// Whether the provider accepts logins; disabled providers fail resolution.
	#[serde(default = "default_true")]
	pub enabled: bool,
	/// OAuth client identifier registered with the provider.
	pub client_id: String,
	/// Optional confidential client secret; omitted for public PKCE-only clients.
	#[serde(default)]
	pub client_secret: Option<SecretString>,
	/// Authorization endpoint end-users are redirected to.
	pub authorization_uri: Url,
	/// Token endpoint used for the code exchange.
	pub token_uri: Url,
	/// Optional user-info endpoint queried with the bearer access token.
	#[serde(default)]
	pub user_info_uri: Option<Url>,
	/// Optional JWKS endpoint; carried for ID-token validation done outside this crate.
	#[serde(default)]
	pub jwks_uri: Option<Url>,
	/// Default redirect URI sent to the provider when the caller supplies none.
	pub redirect_uri: String,
	/// Scopes requested during authorization; empty means the `openid email profile` default.
	#[serde(default)]
	pub scopes: Vec<String>,
	/// Whether the provider requires PKCE on the authorization request.
	#[serde(default = "default_true")]
	pub pkce_required: bool,
}
impl ProviderConfig {
	/// Validates invariants the flows rely on.
	pub fn validate(&self) -> Result<(), ProviderConfigError> {
		if self.name.trim().is_empty() {
			return Err(ProviderConfigError::MissingName);
		}
		if self.client_id.trim().is_empty() {
			return Err(ProviderConfigError::MissingClientId { name: self.name.clone() });
		}

		Ok(())
	}
}

/// Errors raised while validating provider configuration at load time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderConfigError {
	/// Provider entries must carry a non-empty name.
	#[error("Provider configuration is missing a name.")]
	MissingName,
	/// A client identifier is mandatory for every flow.
	#[error("Provider `{name}` is missing a client id.")]
	MissingClientId {
		/// Offending provider name.
		name: String,
	},
}

fn default_true() -> bool {
	true
}
