use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{Span, field};

use super::TraceId;

/// Root span for one evaluation cycle.
pub fn cycle_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "cycle",
        name = %name,
        trace_id = %trace_id.as_str(),
        securities = field::Empty
    )
}

/// Child span for the evaluation of a single security.
pub fn security_span(symbol: &str, exchange: &str) -> Span {
    tracing::info_span!(
        "security",
        symbol = %symbol,
        exchange = %exchange,
        outcome = field::Empty
    )
}

/// Records the outcome of a security evaluation on the current span.
pub fn annotate_security(outcome: &str) {
    Span::current().record("outcome", field::display(outcome));
}

pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
