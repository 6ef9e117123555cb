//! Flow spans and the optional outcome counter.
//!
//! Spans are named `analytics_connect.flow` with `flow` and `stage` fields. With the
//! `metrics` feature, `analytics_connect_flow_total{flow, outcome}` counts attempts,
//! successes and failures.

mod span;

pub use span::FlowSpan;

// self
use crate::_prelude::*;

/// Which entry point a span or counter belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// `GET /auth`.
	Authorize,
	/// `GET /oauth2callback`.
	Callback,
}
impl FlowKind {
	/// Field value used in spans and counter labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Authorize => "authorize",
			Self::Callback => "callback",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Counter label for one step of a flow's life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Flow entered.
	Attempt,
	/// Flow returned `Ok`.
	Success,
	/// Flow returned `Err`.
	Failure,
}
impl FlowOutcome {
	/// Counter label value.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Attempt => "attempt",
			Self::Success => "success",
			Self::Failure => "failure",
		}
	}

	/// `Success` or `Failure` depending on `result`.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { Self::Success } else { Self::Failure }
	}
}

/// Bumps `analytics_connect_flow_total` on the installed recorder.
#[cfg(feature = "metrics")]
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	metrics::counter!(
		"analytics_connect_flow_total",
		"flow" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);
}

/// No-op without the `metrics` feature.
#[cfg(not(feature = "metrics"))]
pub fn record_flow_outcome(_: FlowKind, _: FlowOutcome) {}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn outcome_follows_the_result() {
		assert_eq!(FlowOutcome::of(&Ok::<_, ()>(1)), FlowOutcome::Success);
		assert_eq!(FlowOutcome::of(&Err::<(), _>("boom")), FlowOutcome::Failure);
	}

	#[test]
	fn recording_without_a_recorder_does_nothing() {
		record_flow_outcome(FlowKind::Callback, FlowOutcome::Failure);
	}
}
