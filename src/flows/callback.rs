// self
use crate::{
	_prelude::*,
	http::ProviderHttpClient,
	obs::{FlowKind, FlowOutcome, record_flow_outcome},
	session::TokenBundle,
};

impl<C> super::SocialLoginBroker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Runs the full callback: exchange the code, merge the identity, mint local tokens.
	///
	/// Produces one immutable [`TokenBundle`] per successful callback. Nothing is retried;
	/// any failing step is terminal for the call and no partial tokens are handed out.
	pub async fn complete_login(&self, code: &str, state_value: &str) -> Result<TokenBundle> {
		record_flow_outcome(FlowKind::CompleteLogin, FlowOutcome::Attempt);

		let outcome = self.complete_login_inner(code, state_value).await;

		match &outcome {
			Ok(bundle) => {
				tracing::info!(
					provider = %bundle.provider,
					user = %bundle.user_id,
					"social login completed"
				);
				record_flow_outcome(FlowKind::CompleteLogin, FlowOutcome::Success);
			},
			Err(error) => {
				tracing::warn!(error = %error, "social login failed");
				record_flow_outcome(FlowKind::CompleteLogin, FlowOutcome::Failure);
			},
		}

		outcome
	}

	async fn complete_login_inner(&self, code: &str, state_value: &str) -> Result<TokenBundle> {
		let profile = self.exchange(code, state_value).await?;
		let resolution = self.linking.handle(&profile).await?;
		let details = self.token_issuer.generate(&resolution.user, &resolution.identity)?;
		let refresh_token = self
			.refresh_issuer
			.issue(resolution.user.id, &resolution.identity.provider, resolution.identity.id)
			.await?;

		Ok(TokenBundle {
			access_token: details.access_token,
			refresh_token,
			expires_in_seconds: details.expires_in_seconds,
			token_type: "Bearer".into(),
			user_id: resolution.user.id,
			provider: resolution.identity.provider,
			provider_user_id: resolution.identity.provider_user_id,
		})
	}

	/// Parks a bundle behind a one-time session code for the redirect back to the frontend.
	pub fn handoff(&self, bundle: TokenBundle) -> String {
		self.session_store.create(bundle)
	}

	/// Redeems a one-time session code for its bundle.
	///
	/// Fails with [`Error::InvalidSessionCode`] when the code is unknown, expired, or was
	/// already redeemed; all three look identical to the caller.
	pub fn finalize(&self, code: &str) -> Result<TokenBundle> {
		record_flow_outcome(FlowKind::Finalize, FlowOutcome::Attempt);

		match self.session_store.consume(code) {
			Some(bundle) => {
				record_flow_outcome(FlowKind::Finalize, FlowOutcome::Success);

				Ok(bundle)
			},
			None => {
				record_flow_outcome(FlowKind::Finalize, FlowOutcome::Failure);

				Err(Error::InvalidSessionCode)
			},
		}
	}
}
