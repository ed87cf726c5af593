//! One-time session-code handoff keeping bearer tokens out of redirect URLs.

// self
use crate::{_prelude::*, secret::SecretString};

const SESSION_CODE_BYTES: usize = 32;

/// Everything a successful callback produces for the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenBundle {
	/// Signed local access token.
	pub access_token: String,
	/// Opaque local refresh token.
	pub refresh_token: SecretString,
	/// Access-token lifetime in seconds.
	pub expires_in_seconds: i64,
	/// Always `Bearer`.
	pub token_type: String,
	/// Local user the bundle was minted for.
	pub user_id: Uuid,
	/// Provider that authenticated the user.
	pub provider: String,
	/// Provider-side subject identifier.
	pub provider_user_id: String,
}

/// A stored bundle awaiting its single retrieval.
#[derive(Clone, Debug)]
struct StoredSession {
	bundle: TokenBundle,
	expires_at: OffsetDateTime,
}

/// Concurrent map exchanging a server-generated code for a token bundle exactly once.
///
/// The redirect back to the frontend carries only the opaque code; the bundle itself is
/// fetched out-of-band and the entry is destroyed on first read, closing the window in
/// which tokens would otherwise sit in a URL query string.
#[derive(Debug)]
pub struct LoginSessionStore {
	ttl: Duration,
	sessions: RwLock<HashMap<String, StoredSession>>,
}
impl LoginSessionStore {
	/// Creates a store whose codes expire `ttl` after creation.
	pub fn new(ttl: Duration) -> Self {
		Self { ttl, sessions: RwLock::new(HashMap::new()) }
	}

	/// Stores the bundle under a fresh one-time code and returns the code.
	pub fn create(&self, bundle: TokenBundle) -> String {
		let code = crate::secret::random_token(SESSION_CODE_BYTES);
		let session =
			StoredSession { bundle, expires_at: OffsetDateTime::now_utc() + self.ttl };

		self.sessions.write().insert(code.clone(), session);

		code
	}

	/// Atomically removes and returns the bundle when the code is known and unexpired.
	///
	/// The entry is deleted on the first read regardless of the expiry outcome, so a
	/// replayed code never succeeds twice.
	pub fn consume(&self, code: &str) -> Option<TokenBundle> {
		let session = self.sessions.write().remove(code)?;

		if OffsetDateTime::now_utc() > session.expires_at {
			return None;
		}

		Some(session.bundle)
	}

	/// Drops every entry that expired before `now`; returns how many were removed.
	pub fn evict_expired(&self, now: OffsetDateTime) -> usize {
		let mut sessions = self.sessions.write();
		let before = sessions.len();

		sessions.retain(|_, session| session.expires_at >= now);

		before - sessions.len()
	}

	/// Number of pending codes.
	pub fn len(&self) -> usize {
		self.sessions.read().len()
	}

	/// Checks whether no codes are pending.
	pub fn is_empty(&self) -> bool {
		self.sessions.read().is_empty()
	}
}
