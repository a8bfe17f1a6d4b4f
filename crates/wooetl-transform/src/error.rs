use thiserror::Error;

use crate::coerce::CoercionFailure;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error(
        "{} value(s) failed type coercion; first: {}",
        .failures.len(),
        first_failure(.failures)
    )]
    Coercion { failures: Vec<CoercionFailure> },
}

fn first_failure(failures: &[CoercionFailure]) -> String {
    failures
        .first()
        .map_or_else(|| "none".to_owned(), ToString::to_string)
}
