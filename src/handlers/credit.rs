//! Credit top-up and purchase endpoint.

use axum::extract::State;
use axum::Json;

use crate::models::credit::{CreditMutationOutcome, CreditMutationRequest};
use crate::{ApiResponse, ApiResult, AppState};

pub async fn mutate_credit(
    State(state): State<AppState>,
    Json(request): Json<CreditMutationRequest>,
) -> ApiResult<CreditMutationOutcome> {
    let outcome = state.services.credit.apply(request).await?;
    let message = match outcome.warning.clone() {
        Some(warning) => warning,
        None => format!("{} recorded", outcome.transaction_type),
    };
    Ok(Json(ApiResponse::success_with_message(outcome, message)))
}
