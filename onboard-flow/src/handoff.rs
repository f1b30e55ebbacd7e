use serde_json::Value;
use tracing::info;

use crate::{
    context::HandoffContext,
    error::{FlowError, Result},
    route::{Navigator, Route},
};

/// Hand a step's payload to the next step and move there.
///
/// The payload (if any) replaces whatever `current` stored before. Routes
/// without a successor fail with [`FlowError::NoNextStep`] before anything is
/// written.
pub fn advance(
    context: &HandoffContext,
    navigator: &mut Navigator,
    current: Route,
    payload: Option<Value>,
) -> Result<Route> {
    let next = current.next().ok_or(FlowError::NoNextStep(current))?;

    if let Some(payload) = payload {
        let key = current.handoff_key().ok_or_else(|| {
            FlowError::Context(format!("{} does not hand off data", current.path()))
        })?;
        context.set(key, payload)?;
        info!(key, "Stored handoff payload");
    }

    navigator.navigate(next);
    Ok(next)
}
