use anyhow::Error;

/// Extract the most relevant message from a chained error for the status
/// line. The deepest cause is usually the actionable one.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
