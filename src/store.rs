//! Repository contracts for the persistence collaborators, plus in-memory backends.

/// Thread-safe in-memory repositories for local development and tests.
pub mod memory;

pub use memory::*;

// self
use crate::{
	_prelude::*,
	identity::{ExternalIdentity, LocalUser},
	secret::SecretString,
};

/// Boxed future returned by repository contracts.
pub type RepoFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for local user rows.
pub trait UserRepository
where
	Self: Send + Sync,
{
	/// Fetches a user by id.
	fn find_by_id(&self, id: Uuid) -> RepoFuture<'_, Option<LocalUser>>;

	/// Fetches a user by exact email match.
	fn find_by_email<'a>(&'a self, email: &'a str) -> RepoFuture<'a, Option<LocalUser>>;

	/// Inserts a new user row and returns the stored value.
	fn save(&self, user: LocalUser) -> RepoFuture<'_, LocalUser>;

	/// Replaces an existing user row and returns the stored value.
	fn update(&self, user: LocalUser) -> RepoFuture<'_, LocalUser>;
}

/// Persistence contract for external identity rows.
pub trait ExternalIdentityRepository
where
	Self: Send + Sync,
{
	/// Fetches the identity owning the `(provider, provider_user_id)` pair.
	fn find_by_provider_and_subject<'a>(
		&'a self,
		provider: &'a str,
		provider_user_id: &'a str,
	) -> RepoFuture<'a, Option<ExternalIdentity>>;

	/// Inserts a new identity row and returns the stored value.
	fn save(&self, identity: ExternalIdentity) -> RepoFuture<'_, ExternalIdentity>;

	/// Replaces an existing identity row and returns the stored value.
	fn update(&self, identity: ExternalIdentity) -> RepoFuture<'_, ExternalIdentity>;
}

/// Persistence contract for issued refresh tokens.
pub trait RefreshTokenRepository
where
	Self: Send + Sync,
{
	/// Inserts a freshly issued refresh-token row.
	fn save(&self, record: RefreshTokenRecord) -> RepoFuture<'_, RefreshTokenRecord>;
}

/// Issued local refresh token bound to a user and the identity that produced it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
	/// Row identifier.
	pub id: Uuid,
	/// Owning local user.
	pub user_id: Uuid,
	/// Opaque token value handed to the caller.
	pub token: SecretString,
	/// Provider active at issuance.
	pub provider: String,
	/// Identity the login ran through.
	pub external_identity_id: Uuid,
	/// Whether the token has been revoked.
	pub revoked: bool,
}

/// Error type produced by repository implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
