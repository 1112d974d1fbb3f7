//! Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use tienda_app::domain::carts::CartsServiceError;

use crate::observability::{CartOperation, CartOutcome, observe_cart_mutation};

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::ProductNotFound => StatusError::not_found().brief("Product not found"),
        CartsServiceError::LineNotFound => StatusError::not_found().brief("Cart item not found"),
        CartsServiceError::InsufficientStock { available } => {
            StatusError::conflict().brief(format!("Insufficient stock, {available} available"))
        }
        CartsServiceError::OwnershipViolation => {
            StatusError::forbidden().brief("Cart item belongs to another cart")
        }
        CartsServiceError::Validation { field } => {
            StatusError::bad_request().brief(format!("Invalid value for `{field}`"))
        }
        CartsServiceError::Sql(source) => {
            error!("cart operation failed: {source}");

            StatusError::internal_server_error()
        }
    }
}

fn outcome_of(error: &CartsServiceError) -> CartOutcome {
    match error {
        CartsServiceError::InsufficientStock { .. } => CartOutcome::StockRejected,
        CartsServiceError::ProductNotFound | CartsServiceError::LineNotFound => {
            CartOutcome::NotFound
        }
        CartsServiceError::OwnershipViolation => CartOutcome::Forbidden,
        CartsServiceError::Validation { .. } => CartOutcome::Invalid,
        CartsServiceError::Sql(_) => CartOutcome::Failed,
    }
}

/// Count the mutation's outcome, then map a failure to its HTTP status.
pub(crate) fn observe_mutation<T>(
    operation: CartOperation,
    result: Result<T, CartsServiceError>,
) -> Result<T, StatusError> {
    let outcome = result.as_ref().map_or_else(outcome_of, |_| CartOutcome::Applied);

    observe_cart_mutation(operation, outcome);

    if let Err(CartsServiceError::InsufficientStock { available }) = &result {
        warn!(operation = ?operation, available, "cart mutation refused for stock");
    }

    result.map_err(into_status_error)
}
