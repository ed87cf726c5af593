//! Local users, external identities, and the normalized profile that links them.

/// First-login creation, re-login update, and collision-by-email linking.
pub mod linking;

pub use linking::*;

// self
use crate::{_prelude::*, secret::SecretString};

/// Provider-agnostic result of a completed code exchange.
///
/// Only `provider_user_id` is required downstream; every other field is whatever the
/// provider chose to share.
#[derive(Clone, Debug)]
pub struct ExternalProfile {
	/// Provider that authenticated the user.
	pub provider: String,
	/// Provider-side subject identifier (`sub`, falling back to `id`).
	pub provider_user_id: Option<String>,
	/// Email address reported by the provider.
	pub email: Option<String>,
	/// Whether the provider vouches for the email.
	pub email_verified: bool,
	/// Human-readable name (`name`, falling back to `given_name`).
	pub display_name: Option<String>,
	/// Avatar URL.
	pub picture_url: Option<String>,
	/// Provider access token.
	pub access_token: Option<SecretString>,
	/// Provider refresh token, when `access_type=offline` was honored.
	pub refresh_token: Option<SecretString>,
	/// Raw OpenID Connect ID token, unvalidated.
	pub id_token: Option<SecretString>,
	/// Provider access-token expiry, when the response carried `expires_in`.
	pub expires_at: Option<OffsetDateTime>,
	/// User-info claims document; an empty object when no user-info endpoint is configured.
	pub raw_claims: serde_json::Value,
}

/// Persisted link between a provider subject and a local account.
///
/// Unique on `(provider, provider_user_id)`; owned by exactly one user, while a user may
/// hold one identity per provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExternalIdentity {
	/// Row identifier.
	pub id: Uuid,
	/// Owning local user.
	pub user_id: Uuid,
	/// Provider name.
	pub provider: String,
	/// Provider-side subject identifier.
	pub provider_user_id: String,
	/// Email as last reported by the provider.
	pub email: Option<String>,
	/// Display name as last reported by the provider.
	pub display_name: Option<String>,
	/// Avatar URL as last reported by the provider.
	pub picture_url: Option<String>,
	/// Sealed provider access token.
	pub access_token_encrypted: Option<String>,
	/// Sealed provider refresh token.
	pub refresh_token_encrypted: Option<String>,
	/// Claims document captured at the last login.
	pub raw_claims: serde_json::Value,
	/// Provider access-token expiry.
	pub expires_at: Option<OffsetDateTime>,
	/// Last successful login through this identity.
	pub last_login_at: Option<OffsetDateTime>,
	/// Whether the link has been revoked; cleared again on every successful login.
	pub revoked: bool,
}
impl ExternalIdentity {
	/// Bare link carrying only the unique key and owner; merge fills in the rest.
	pub(crate) fn skeleton(provider: &str, provider_user_id: &str, user_id: Uuid) -> Self {
		Self {
			id: Uuid::new_v4(),
			user_id,
			provider: provider.to_owned(),
			provider_user_id: provider_user_id.to_owned(),
			email: None,
			display_name: None,
			picture_url: None,
			access_token_encrypted: None,
			refresh_token_encrypted: None,
			raw_claims: serde_json::Value::Object(Default::default()),
			expires_at: None,
			last_login_at: None,
			revoked: false,
		}
	}
}

/// Local account record.
///
/// Referenced by the linking flow; accounts created here are social-only and carry no
/// password hash.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalUser {
	/// Row identifier.
	pub id: Uuid,
	/// Unique login handle.
	pub username: String,
	/// Email address.
	pub email: Option<String>,
	/// Whether some provider has vouched for the email; promotes, never demotes.
	pub email_verified: bool,
	/// Avatar URL.
	pub picture_url: Option<String>,
	/// Password hash; `None` for social-only accounts.
	pub password_hash: Option<String>,
	/// Creation instant.
	pub created_at: OffsetDateTime,
	/// Last modification instant.
	pub updated_at: OffsetDateTime,
	/// Last successful login.
	pub last_login_at: Option<OffsetDateTime>,
}
impl LocalUser {
	/// Creates a social-only account from a profile.
	pub(crate) fn from_profile(profile: &ExternalProfile, now: OffsetDateTime) -> Self {
		Self {
			id: Uuid::new_v4(),
			username: derive_username(profile),
			email: profile.email.clone(),
			email_verified: profile.email_verified,
			picture_url: profile.picture_url.clone(),
			password_hash: None,
			created_at: now,
			updated_at: now,
			last_login_at: None,
		}
	}
}

/// Derives a login handle: display name with whitespace collapsed to `.` and lower-cased,
/// else the email local part, else `<provider>_<provider_user_id>`.
fn derive_username(profile: &ExternalProfile) -> String {
	if let Some(name) = profile.display_name.as_deref().filter(|name| !name.trim().is_empty()) {
		return name.split_whitespace().collect::<Vec<_>>().join(".").to_lowercase();
	}
	if let Some(email) = profile.email.as_deref().filter(|email| !email.is_empty()) {
		return email.split('@').next().unwrap_or(email).to_owned();
	}

	format!(
		"{}_{}",
		profile.provider,
		profile.provider_user_id.as_deref().unwrap_or_default()
	)
}
