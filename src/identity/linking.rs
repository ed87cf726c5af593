// self
use crate::{
	_prelude::*,
	crypto::TokenEncryptionService,
	identity::{ExternalIdentity, ExternalProfile, LocalUser},
	secret::SecretString,
	store::{ExternalIdentityRepository, UserRepository},
};

/// How a profile resolves against the existing rows, decided before any write.
///
/// Keeping the decision a pure function over the two lookups makes the branch matrix
/// testable without repositories in play.
#[derive(Clone, Debug)]
pub enum LinkPlan {
	/// The `(provider, provider_user_id)` pair is already linked; this is a re-login.
	Relogin {
		/// The existing link row.
		identity: ExternalIdentity,
	},
	/// No link yet, but a local account matches the profile's email and may adopt it.
	AdoptByEmail {
		/// The matching local account.
		user: LocalUser,
	},
	/// Neither a link nor an email match; a fresh social-only account is created.
	FirstLogin,
}

/// Resolves the merge branch for a profile.
///
/// Adopting an account by bare email match is only allowed when the provider vouches for
/// that email; an unverified match is refused rather than silently linked, since anyone
/// can register an unverified address at a sloppy provider.
pub fn resolve_link(
	existing_identity: Option<ExternalIdentity>,
	user_by_email: Option<LocalUser>,
	email_verified: bool,
	provider: &str,
) -> Result<LinkPlan> {
	if let Some(identity) = existing_identity {
		return Ok(LinkPlan::Relogin { identity });
	}
	if let Some(user) = user_by_email {
		if !email_verified {
			return Err(Error::UnverifiedEmail { provider: provider.to_owned() });
		}

		return Ok(LinkPlan::AdoptByEmail { user });
	}

	Ok(LinkPlan::FirstLogin)
}

/// Resolved user and identity rows after a successful login merge.
#[derive(Clone, Debug)]
pub struct LoginResolution {
	/// The local account the login resolved to.
	pub user: LocalUser,
	/// The identity row after the merge.
	pub identity: ExternalIdentity,
}

/// Merges external profiles into local user and identity rows.
///
/// The merge is an idempotent upsert: replaying the same profile yields the same final
/// state apart from timestamps.
#[derive(Clone)]
pub struct IdentityLinkingService {
	users: Arc<dyn UserRepository>,
	identities: Arc<dyn ExternalIdentityRepository>,
	encryption: TokenEncryptionService,
}
impl IdentityLinkingService {
	/// Wires the service to its repositories and the token sealer.
	pub fn new(
		users: Arc<dyn UserRepository>,
		identities: Arc<dyn ExternalIdentityRepository>,
		encryption: TokenEncryptionService,
	) -> Self {
		Self { users, identities, encryption }
	}

	/// Resolves the profile to a local account and upserts the identity link.
	pub async fn handle(&self, profile: &ExternalProfile) -> Result<LoginResolution> {
		let subject = profile
			.provider_user_id
			.as_deref()
			.filter(|subject| !subject.is_empty())
			.ok_or(Error::MissingProviderUserId)?;
		let existing =
			self.identities.find_by_provider_and_subject(&profile.provider, subject).await?;
		let user_by_email = match (&existing, profile.email.as_deref()) {
			(None, Some(email)) => self.users.find_by_email(email).await?,
			_ => None,
		};
		let plan = resolve_link(existing, user_by_email, profile.email_verified, &profile.provider)?;
		let now = OffsetDateTime::now_utc();
		let (user, identity, is_new_identity) = match plan {
			LinkPlan::Relogin { identity } => {
				let user = self
					.users
					.find_by_id(identity.user_id)
					.await?
					.ok_or(Error::OrphanedIdentity { user_id: identity.user_id })?;

				tracing::debug!(provider = %profile.provider, user = %user.id, "social re-login");

				(user, identity, false)
			},
			LinkPlan::AdoptByEmail { user } => {
				tracing::info!(
					provider = %profile.provider,
					user = %user.id,
					"linking provider identity to existing account by verified email"
				);

				let identity = ExternalIdentity::skeleton(&profile.provider, subject, user.id);

				(user, identity, true)
			},
			LinkPlan::FirstLogin => {
				let user = self.users.save(LocalUser::from_profile(profile, now)).await?;

				tracing::info!(provider = %profile.provider, user = %user.id, "first social login");

				let identity = ExternalIdentity::skeleton(&profile.provider, subject, user.id);

				(user, identity, true)
			},
		};
		let identity = self.merge_identity(identity, profile, user.id, now, is_new_identity).await?;
		let user = self.merge_user(user, profile, now).await?;

		Ok(LoginResolution { user, identity })
	}

	async fn merge_identity(
		&self,
		mut identity: ExternalIdentity,
		profile: &ExternalProfile,
		user_id: Uuid,
		now: OffsetDateTime,
		is_new: bool,
	) -> Result<ExternalIdentity> {
		identity.user_id = user_id;
		identity.email = profile.email.clone();
		identity.display_name = profile.display_name.clone();
		identity.picture_url = profile.picture_url.clone();
		identity.last_login_at = Some(now);
		identity.access_token_encrypted =
			self.encryption.encrypt_opt(profile.access_token.as_ref().map(SecretString::expose))?;
		identity.refresh_token_encrypted =
			self.encryption.encrypt_opt(profile.refresh_token.as_ref().map(SecretString::expose))?;
		identity.raw_claims = profile.raw_claims.clone();
		identity.expires_at = profile.expires_at;
		identity.revoked = false;

		let identity = if is_new {
			self.identities.save(identity).await?
		} else {
			self.identities.update(identity).await?
		};

		Ok(identity)
	}

	async fn merge_user(
		&self,
		mut user: LocalUser,
		profile: &ExternalProfile,
		now: OffsetDateTime,
	) -> Result<LocalUser> {
		user.last_login_at = Some(now);
		user.updated_at = now;

		// Verification only ever promotes; a later unverified login must not demote it.
		if profile.email_verified {
			user.email_verified = true;
		}
		if let Some(picture) = profile.picture_url.as_deref().filter(|url| !url.is_empty()) {
			user.picture_url = Some(picture.to_owned());
		}

		Ok(self.users.update(user).await?)
	}
}
impl Debug for IdentityLinkingService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdentityLinkingService").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::identity::tests::profile_fixture;

	fn identity_fixture(user_id: Uuid) -> ExternalIdentity {
		ExternalIdentity::skeleton("google", "subject-1", user_id)
	}

	fn user_fixture() -> LocalUser {
		LocalUser::from_profile(&profile_fixture(), OffsetDateTime::now_utc())
	}

	#[test]
	fn existing_identity_wins_over_email_match() {
		let user = user_fixture();
		let identity = identity_fixture(user.id);
		let plan = resolve_link(Some(identity.clone()), Some(user), false, "google")
			.expect("Existing identity should resolve regardless of verification.");

		assert!(matches!(
			plan,
			LinkPlan::Relogin { identity: resolved } if resolved.id == identity.id
		));
	}

	#[test]
	fn verified_email_match_adopts_the_account() {
		let user = user_fixture();
		let plan = resolve_link(None, Some(user.clone()), true, "google")
			.expect("Verified email match should adopt.");

		assert!(matches!(plan, LinkPlan::AdoptByEmail { user: adopted } if adopted.id == user.id));
	}

	#[test]
	fn unverified_email_match_is_refused() {
		let err = resolve_link(None, Some(user_fixture()), false, "google")
			.expect_err("Unverified email match must be refused.");

		assert!(matches!(err, Error::UnverifiedEmail { provider } if provider == "google"));
	}

	#[test]
	fn no_match_means_first_login() {
		let plan = resolve_link(None, None, false, "google")
			.expect("No match should resolve to a first login.");

		assert!(matches!(plan, LinkPlan::FirstLogin));
	}
}
