//! Crate-level error types shared across flows, linking, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// No provider is registered under the requested name.
	#[error("Unsupported OAuth provider: {name}.")]
	UnknownProvider {
		/// Name the caller asked for.
		name: String,
	},
	/// The provider exists but is switched off in configuration.
	#[error("OAuth provider is disabled: {name}.")]
	ProviderDisabled {
		/// Name the caller asked for.
		name: String,
	},
	/// Authorization state is missing, expired, or already consumed.
	#[error("Invalid authorization state value.")]
	InvalidState,
	/// Session code is missing, expired, or already consumed.
	#[error("Invalid or already consumed session code.")]
	InvalidSessionCode,
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint failed with status {status}: {body}.")]
	TokenExchangeFailed {
		/// HTTP status returned by the provider.
		status: u16,
		/// Upstream response body kept for diagnosis.
		body: String,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status the body arrived with.
		status: u16,
	},
	/// User-info endpoint answered with a non-success status or a non-JSON body.
	#[error("User info endpoint failed with status {status}: {body}.")]
	UserInfoFailed {
		/// HTTP status returned by the provider.
		status: u16,
		/// Upstream response body kept for diagnosis.
		body: String,
	},
	/// External profile arrived without a provider-side subject identifier.
	#[error("External profile is missing the provider user id.")]
	MissingProviderUserId,
	/// An identity row points at a user row that no longer exists.
	#[error("External identity references missing user {user_id}.")]
	OrphanedIdentity {
		/// Owner recorded on the dangling identity.
		user_id: Uuid,
	},
	/// A local account matched by email, but the provider did not verify that email.
	#[error("Provider {provider} did not verify the email; refusing to link by email.")]
	UnverifiedEmail {
		/// Provider that supplied the unverified email.
		provider: String,
	},
	/// Local access token could not be signed.
	#[error("Unable to sign the local access token.")]
	SigningFailed {
		/// Underlying signer failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// Provider token could not be sealed or opened.
	#[error("Token encryption failed.")]
	EncryptionFailed,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		Self::network(e)
	}
}
