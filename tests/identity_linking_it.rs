// std
use std::sync::Arc;
// crates.io
use time::OffsetDateTime;
use uuid::Uuid;
// self
use social_login_broker::{
	crypto::TokenEncryptionService,
	error::Error,
	identity::{ExternalIdentity, ExternalProfile, IdentityLinkingService, LocalUser},
	secret::SecretString,
	store::{
		ExternalIdentityRepository, UserRepository,
		memory::{MemoryExternalIdentityRepository, MemoryUserRepository},
	},
};

const ENCRYPTION_SECRET: &str = "linking-it-encryption-secret";

struct Fixture {
	service: IdentityLinkingService,
	users: Arc<MemoryUserRepository>,
	identities: Arc<MemoryExternalIdentityRepository>,
	encryption: TokenEncryptionService,
}

fn fixture() -> Fixture {
	let users = Arc::new(MemoryUserRepository::default());
	let identities = Arc::new(MemoryExternalIdentityRepository::default());
	let encryption = TokenEncryptionService::new(&SecretString::new(ENCRYPTION_SECRET));
	let service =
		IdentityLinkingService::new(users.clone(), identities.clone(), encryption.clone());

	Fixture { service, users, identities, encryption }
}

fn profile() -> ExternalProfile {
	ExternalProfile {
		provider: "google".into(),
		provider_user_id: Some("subject-77".into()),
		email: Some("jane.doe@example.com".into()),
		email_verified: true,
		display_name: Some("Jane Doe".into()),
		picture_url: Some("https://img.example.com/jane.png".into()),
		access_token: Some(SecretString::new("provider-access")),
		refresh_token: Some(SecretString::new("provider-refresh")),
		id_token: None,
		expires_at: None,
		raw_claims: serde_json::json!({ "sub": "subject-77", "email": "jane.doe@example.com" }),
	}
}

fn local_user(email: &str) -> LocalUser {
	let now = OffsetDateTime::now_utc();

	LocalUser {
		id: Uuid::new_v4(),
		username: "existing.account".into(),
		email: Some(email.into()),
		email_verified: false,
		picture_url: None,
		password_hash: Some("argon2-hash".into()),
		created_at: now,
		updated_at: now,
		last_login_at: None,
	}
}

#[tokio::test]
async fn first_login_creates_a_social_only_account() {
	let fixture = fixture();
	let resolution =
		fixture.service.handle(&profile()).await.expect("First login should succeed.");

	assert_eq!(fixture.users.len(), 1);
	assert_eq!(fixture.identities.len(), 1);
	assert_eq!(resolution.user.username, "jane.doe");
	assert_eq!(resolution.user.password_hash, None);
	assert!(resolution.user.email_verified);
	assert_eq!(resolution.identity.provider, "google");
	assert_eq!(resolution.identity.provider_user_id, "subject-77");
	assert_eq!(resolution.identity.user_id, resolution.user.id);
	assert!(!resolution.identity.revoked);

	let sealed = resolution
		.identity
		.access_token_encrypted
		.expect("Access token should be sealed at rest.");

	assert_ne!(sealed, "provider-access");
	assert_eq!(
		fixture.encryption.decrypt(&sealed).expect("Sealed token should open."),
		"provider-access"
	);
}

#[tokio::test]
async fn replaying_the_same_profile_updates_instead_of_duplicating() {
	let fixture = fixture();
	let first = fixture.service.handle(&profile()).await.expect("First login should succeed.");
	let second =
		fixture.service.handle(&profile()).await.expect("Second login should succeed.");

	assert_eq!(fixture.users.len(), 1, "Replay must not create a second user row.");
	assert_eq!(fixture.identities.len(), 1, "Replay must not create a second identity row.");
	assert_eq!(first.user.id, second.user.id);
	assert_eq!(first.identity.id, second.identity.id);
}

#[tokio::test]
async fn verified_email_match_adopts_the_existing_account() {
	let fixture = fixture();
	let existing = local_user("jane.doe@example.com");

	fixture.users.save(existing.clone()).await.expect("Seeding the user should succeed.");

	let resolution = fixture
		.service
		.handle(&profile())
		.await
		.expect("Verified email match should link.");

	assert_eq!(resolution.user.id, existing.id);
	assert_eq!(fixture.users.len(), 1);
	assert_eq!(fixture.identities.len(), 1);
	assert_eq!(
		resolution.user.password_hash.as_deref(),
		Some("argon2-hash"),
		"Adoption must not touch the password credential."
	);
}

#[tokio::test]
async fn unverified_email_match_is_refused() {
	let fixture = fixture();

	fixture
		.users
		.save(local_user("jane.doe@example.com"))
		.await
		.expect("Seeding the user should succeed.");

	let mut unverified = profile();

	unverified.email_verified = false;

	let err = fixture
		.service
		.handle(&unverified)
		.await
		.expect_err("Unverified email match must be refused.");

	assert!(matches!(err, Error::UnverifiedEmail { provider } if provider == "google"));
	assert!(fixture.identities.is_empty(), "Refused links must leave no identity row.");
}

#[tokio::test]
async fn email_verification_promotes_and_never_demotes() {
	let fixture = fixture();
	let mut unverified = profile();

	unverified.email_verified = false;

	let first = fixture
		.service
		.handle(&unverified)
		.await
		.expect("Unverified first login should still create the account.");

	assert!(!first.user.email_verified);

	let promoted =
		fixture.service.handle(&profile()).await.expect("Verified re-login should succeed.");

	assert!(promoted.user.email_verified);

	let after = fixture
		.service
		.handle(&unverified)
		.await
		.expect("Unverified re-login should succeed.");

	assert!(after.user.email_verified, "A later unverified login must not demote.");
}

#[tokio::test]
async fn missing_subject_is_rejected() {
	let fixture = fixture();
	let mut anonymous = profile();

	anonymous.provider_user_id = None;

	let err = fixture
		.service
		.handle(&anonymous)
		.await
		.expect_err("A profile without a subject must be rejected.");

	assert!(matches!(err, Error::MissingProviderUserId));
	assert!(fixture.users.is_empty());
}

#[tokio::test]
async fn dangling_identity_surfaces_an_invariant_violation() {
	let fixture = fixture();
	let orphan_owner = Uuid::new_v4();
	let identity = ExternalIdentity {
		id: Uuid::new_v4(),
		user_id: orphan_owner,
		provider: "google".into(),
		provider_user_id: "subject-77".into(),
		email: None,
		display_name: None,
		picture_url: None,
		access_token_encrypted: None,
		refresh_token_encrypted: None,
		raw_claims: serde_json::json!({}),
		expires_at: None,
		last_login_at: None,
		revoked: false,
	};

	fixture
		.identities
		.save(identity)
		.await
		.expect("Seeding the dangling identity should succeed.");

	let err = fixture
		.service
		.handle(&profile())
		.await
		.expect_err("A dangling identity must surface as an invariant violation.");

	assert!(matches!(err, Error::OrphanedIdentity { user_id } if user_id == orphan_owner));
}
