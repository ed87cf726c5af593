// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
// self
use crate::{
	_prelude::*,
	identity::{ExternalIdentity, LocalUser},
	secret::SecretString,
};

/// Claims carried by a minted local access token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
	/// Local user id, stringified.
	pub sub: String,
	/// Fixed service identifier.
	pub iss: String,
	/// Issued-at, seconds since the epoch.
	pub iat: i64,
	/// Expiry, seconds since the epoch.
	pub exp: i64,
	/// User email.
	pub email: Option<String>,
	/// Whether some provider vouched for the email.
	pub email_verified: bool,
	/// Avatar URL.
	pub picture: Option<String>,
	/// Provider the login ran through.
	pub idp_provider: String,
	/// Provider-side subject identifier.
	pub external_subject: String,
}

/// A freshly minted access token and its remaining lifetime.
#[derive(Clone, Debug)]
pub struct TokenDetails {
	/// Signed compact JWT.
	pub access_token: String,
	/// Seconds until expiry.
	pub expires_in_seconds: i64,
}

/// Mints HS256-signed local access tokens bound to a resolved login.
#[derive(Clone)]
pub struct JwtTokenService {
	encoding_key: EncodingKey,
	access_token_ttl: Duration,
	issuer: String,
}
impl JwtTokenService {
	/// Builds the signer from the shared secret, token TTL, and issuer claim.
	pub fn new(secret: &SecretString, access_token_ttl: Duration, issuer: impl Into<String>) -> Self {
		Self {
			encoding_key: EncodingKey::from_secret(secret.expose().as_bytes()),
			access_token_ttl,
			issuer: issuer.into(),
		}
	}

	/// Signs an access token for the resolved user/identity pair.
	pub fn generate(&self, user: &LocalUser, identity: &ExternalIdentity) -> Result<TokenDetails> {
		let now = OffsetDateTime::now_utc();
		let expires_at = now + self.access_token_ttl;
		let claims = AccessTokenClaims {
			sub: user.id.to_string(),
			iss: self.issuer.clone(),
			iat: now.unix_timestamp(),
			exp: expires_at.unix_timestamp(),
			email: user.email.clone(),
			email_verified: user.email_verified,
			picture: user.picture_url.clone(),
			idp_provider: identity.provider.clone(),
			external_subject: identity.provider_user_id.clone(),
		};
		let access_token =
			jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
				.map_err(|source| Error::SigningFailed { source })?;

		Ok(TokenDetails {
			access_token,
			expires_in_seconds: (expires_at - now).whole_seconds(),
		})
	}
}
impl Debug for JwtTokenService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JwtTokenService")
			.field("access_token_ttl", &self.access_token_ttl)
			.field("issuer", &self.issuer)
			.finish_non_exhaustive()
	}
}
