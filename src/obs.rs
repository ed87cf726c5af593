//! Optional observability helpers for login flows.
//!
//! Enable the `metrics` feature to increment the `social_login_flow_total` counter for
//! every attempt/success/failure, labeled by `flow` + `outcome`. Structured logging via
//! `tracing` is always on.

// self
use crate::_prelude::*;

/// Login flow stages observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization URL construction.
	Authorize,
	/// Code-for-token exchange and profile normalization.
	Exchange,
	/// Full callback: exchange, link, mint, issue.
	CompleteLogin,
	/// One-time session-code redemption.
	Finalize,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Authorize => "authorize",
			FlowKind::Exchange => "exchange",
			FlowKind::CompleteLogin => "complete_login",
			FlowKind::Finalize => "finalize",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"social_login_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_flow_outcome_noop_without_metrics() {
		record_flow_outcome(FlowKind::CompleteLogin, FlowOutcome::Failure);
	}

	#[test]
	fn labels_are_stable() {
		assert_eq!(FlowKind::Authorize.to_string(), "authorize");
		assert_eq!(FlowOutcome::Success.to_string(), "success");
	}
}
