//! Thread-safe in-memory repository implementations for local development and tests.

// self
use crate::{
	_prelude::*,
	identity::{ExternalIdentity, LocalUser},
	store::{
		ExternalIdentityRepository, RefreshTokenRecord, RefreshTokenRepository, RepoFuture,
		StoreError, UserRepository,
	},
};

type UserMap = Arc<RwLock<HashMap<Uuid, LocalUser>>>;
type IdentityMap = Arc<RwLock<HashMap<Uuid, ExternalIdentity>>>;
type RefreshTokenMap = Arc<RwLock<HashMap<Uuid, RefreshTokenRecord>>>;

fn missing_row(entity: &str, id: Uuid) -> StoreError {
	StoreError::Backend { message: format!("no {entity} row with id {id}") }
}

/// In-process [`UserRepository`] backed by a hash map.
#[derive(Clone, Debug, Default)]
pub struct MemoryUserRepository(UserMap);
impl MemoryUserRepository {
	fn save_now(map: UserMap, user: LocalUser) -> LocalUser {
		map.write().insert(user.id, user.clone());

		user
	}

	fn update_now(map: UserMap, user: LocalUser) -> Result<LocalUser, StoreError> {
		let mut guard = map.write();

		if !guard.contains_key(&user.id) {
			return Err(missing_row("user", user.id));
		}

		guard.insert(user.id, user.clone());

		Ok(user)
	}

	/// Number of stored rows.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Checks whether no rows are stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl UserRepository for MemoryUserRepository {
	fn find_by_id(&self, id: Uuid) -> RepoFuture<'_, Option<LocalUser>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(&id).cloned()) })
	}

	fn find_by_email<'a>(&'a self, email: &'a str) -> RepoFuture<'a, Option<LocalUser>> {
		let map = self.0.clone();

		Box::pin(async move {
			Ok(map
				.read()
				.values()
				.find(|user| user.email.as_deref() == Some(email))
				.cloned())
		})
	}

	fn save(&self, user: LocalUser) -> RepoFuture<'_, LocalUser> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::save_now(map, user)) })
	}

	fn update(&self, user: LocalUser) -> RepoFuture<'_, LocalUser> {
		let map = self.0.clone();

		Box::pin(async move { Self::update_now(map, user) })
	}
}

/// In-process [`ExternalIdentityRepository`] backed by a hash map.
#[derive(Clone, Debug, Default)]
pub struct MemoryExternalIdentityRepository(IdentityMap);
impl MemoryExternalIdentityRepository {
	fn update_now(
		map: IdentityMap,
		identity: ExternalIdentity,
	) -> Result<ExternalIdentity, StoreError> {
		let mut guard = map.write();

		if !guard.contains_key(&identity.id) {
			return Err(missing_row("external identity", identity.id));
		}

		guard.insert(identity.id, identity.clone());

		Ok(identity)
	}

	/// Number of stored rows.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Checks whether no rows are stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl ExternalIdentityRepository for MemoryExternalIdentityRepository {
	fn find_by_provider_and_subject<'a>(
		&'a self,
		provider: &'a str,
		provider_user_id: &'a str,
	) -> RepoFuture<'a, Option<ExternalIdentity>> {
		let map = self.0.clone();

		Box::pin(async move {
			Ok(map
				.read()
				.values()
				.find(|identity| {
					identity.provider == provider && identity.provider_user_id == provider_user_id
				})
				.cloned())
		})
	}

	fn save(&self, identity: ExternalIdentity) -> RepoFuture<'_, ExternalIdentity> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(identity.id, identity.clone());

			Ok(identity)
		})
	}

	fn update(&self, identity: ExternalIdentity) -> RepoFuture<'_, ExternalIdentity> {
		let map = self.0.clone();

		Box::pin(async move { Self::update_now(map, identity) })
	}
}

/// In-process [`RefreshTokenRepository`] backed by a hash map.
#[derive(Clone, Debug, Default)]
pub struct MemoryRefreshTokenRepository(RefreshTokenMap);
impl MemoryRefreshTokenRepository {
	/// Number of stored rows.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Checks whether no rows are stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Snapshot of every stored row, for test assertions.
	pub fn all(&self) -> Vec<RefreshTokenRecord> {
		self.0.read().values().cloned().collect()
	}
}
impl RefreshTokenRepository for MemoryRefreshTokenRepository {
	fn save(&self, record: RefreshTokenRecord) -> RepoFuture<'_, RefreshTokenRecord> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(record.id, record.clone());

			Ok(record)
		})
	}
}
