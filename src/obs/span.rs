// crates.io
use tracing::{Instrument, Span, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::FlowKind};

/// `analytics_connect.flow` span for one stage of a flow.
#[derive(Clone, Debug)]
pub struct FlowSpan(Span);
impl FlowSpan {
	/// Opens a span at info level.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		Self(tracing::info_span!("analytics_connect.flow", flow = kind.as_str(), stage))
	}

	/// Runs `f` with the span entered.
	pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
		self.0.in_scope(f)
	}

	/// Attaches the span to `fut` for every poll.
	pub fn in_span<Fut: Future>(&self, fut: Fut) -> Instrumented<Fut> {
		fut.instrument(self.0.clone())
	}
}
