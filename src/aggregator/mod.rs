//! Check execution and result aggregation.
//!
//! Runs every registered check against the shared immutable change
//! snapshot, collects all findings in declared check order, and folds
//! the severities into a single gate decision. The contract is "run
//! everything, report everything": a faulting or panicking check becomes
//! one Error finding and the remaining checks still run.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::checks::Check;
use crate::models::{ChangeContext, GateDecision, ResultItem, Severity};

/// The outcome of one full gate run.
#[derive(Debug, Clone, Serialize)]
pub struct GateReport {
    /// Complete ordered result sequence (declared check order).
    pub items: Vec<ResultItem>,
    pub decision: GateDecision,
}

/// Execute all checks and compute the gate decision.
///
/// Checks are independent and run concurrently; results are collected
/// by declared index so output order is deterministic regardless of
/// completion order. There is no cancellation: even after an Error has
/// guaranteed a Block, the full list runs to completion so every
/// finding is reported in one pass.
pub async fn run_checks(checks: Vec<Arc<dyn Check>>, ctx: Arc<ChangeContext>) -> GateReport {
    let mut join_set = JoinSet::new();

    for (index, check) in checks.iter().enumerate() {
        let check = Arc::clone(check);
        let ctx = Arc::clone(&ctx);
        join_set.spawn(async move {
            let name = check.name().to_string();
            // The check body runs in its own task so a panic surfaces
            // here as a JoinError and can still be attributed to the
            // check by name, in its declared slot.
            let body = tokio::spawn(async move { check.run(&ctx).await });
            let items = match body.await {
                Ok(Ok(items)) => items,
                Ok(Err(e)) => vec![ResultItem::finding(
                    &name,
                    Severity::Error,
                    format!("Check '{name}' failed: {e}"),
                )],
                Err(e) => {
                    eprintln!("Warning: check '{name}' panicked: {e}");
                    vec![ResultItem::finding(
                        &name,
                        Severity::Error,
                        format!("Check '{name}' panicked during execution."),
                    )]
                }
            };
            (index, items)
        });
    }

    let mut slots: Vec<Option<Vec<ResultItem>>> = vec![None; checks.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, items)) => slots[index] = Some(items),
            // The wrapper task itself never panics; a join failure here
            // means the runtime is shutting down.
            Err(e) => eprintln!("Warning: check task lost: {e}"),
        }
    }

    let items: Vec<ResultItem> = slots.into_iter().flatten().flatten().collect();
    let decision = GateDecision::from_results(&items, ctx.committing);
    GateReport { items, decision }
}
