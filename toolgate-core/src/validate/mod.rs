mod rules;
mod validator;

use crate::error::ValidationError;
use validator::Validator;

pub use validator::MAX_ROUTES;

/// Structural validation of a current-dialect `main` block.
///
/// A non-object `main` or a missing/mistyped required field stops validation immediately;
/// every other rule runs and all violations are reported together.
pub fn validate_main(main: &serde_json::Value) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.validate_main(main);
    v.finish()
}
