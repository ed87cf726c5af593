// self
use crate::{
	_prelude::*,
	secret::SecretString,
	store::{RefreshTokenRecord, RefreshTokenRepository},
};

const REFRESH_TOKEN_BYTES: usize = 64;

/// Issues opaque local refresh tokens bound to a user and identity.
///
/// Every call mints a fresh value; existing tokens are neither reused nor rotated here.
#[derive(Clone)]
pub struct RefreshTokenIssuer {
	repository: Arc<dyn RefreshTokenRepository>,
}
impl RefreshTokenIssuer {
	/// Wires the issuer to its repository.
	pub fn new(repository: Arc<dyn RefreshTokenRepository>) -> Self {
		Self { repository }
	}

	/// Mints, persists, and returns a fresh refresh token.
	///
	/// The raw value is returned exactly once; the stored record is never handed back.
	pub async fn issue(
		&self,
		user_id: Uuid,
		provider: &str,
		external_identity_id: Uuid,
	) -> Result<SecretString> {
		let token = SecretString::new(crate::secret::random_token(REFRESH_TOKEN_BYTES));
		let record = RefreshTokenRecord {
			id: Uuid::new_v4(),
			user_id,
			token: token.clone(),
			provider: provider.to_owned(),
			external_identity_id,
			revoked: false,
		};

		self.repository.save(record).await?;

		Ok(token)
	}
}
impl Debug for RefreshTokenIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshTokenIssuer").finish_non_exhaustive()
	}
}
