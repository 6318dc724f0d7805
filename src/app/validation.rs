use studon_core::{RunRequest, ValidationError};

/// Title shown with every input warning.
pub(crate) const MISSING_INPUT_TITLE: &str = "Missing input";

/// Validates inputs for `--list-only`, which never writes to disk and so
/// does not need a target folder.
pub(crate) fn validate_list_request(request: &RunRequest) -> Result<(), ValidationError> {
    match request.validate() {
        Err(ValidationError::MissingOutputDir) => {
            if request.credentials().is_complete() {
                Ok(())
            } else {
                Err(ValidationError::MissingCookie)
            }
        }
        other => other,
    }
}

/// Formats an input warning for stderr.
pub(crate) fn format_missing_input(error: ValidationError) -> String {
    format!("{MISSING_INPUT_TITLE}: {error}")
}
