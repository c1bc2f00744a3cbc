use crate::AppState;
use crate::api::error::AppError;
use crate::models::{CARD_BACK_FIELD, CARD_FRONT_FIELD, TruckDetails};
use crate::services::form::parse_request;
use crate::services::relay::relay_order;
use axum::{
    Json,
    extract::{Request, State},
    http::Method,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Photos uploaded and sent to Telegram successfully!";

/// Multipart body accepted by the upload endpoint
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadForm {
    #[schema(example = "7")]
    pub truck_id: Option<String>,
    #[schema(example = "Taco Rex")]
    pub truck_name: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub card_front: Vec<u8>,
    #[schema(value_type = String, format = Binary)]
    pub card_back: Vec<u8>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    #[schema(example = "TRUCK-1760601600000")]
    pub order_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/telegram-upload",
    request_body(content = UploadForm, description = "Truck details and card photos", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Alert and photos sent to Telegram", body = UploadResponse),
        (status = 400, description = "Missing one or both card photos", body = MessageResponse),
        (status = 405, description = "Method other than POST", body = MessageResponse),
        (status = 500, description = "Missing Telegram configuration, unreadable form or failed transmission", body = MessageResponse)
    ),
    tag = "upload"
)]
pub async fn telegram_upload(
    State(state): State<AppState>,
    method: Method,
    request: Request,
) -> Result<Json<UploadResponse>, AppError> {
    if method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    let credentials = state
        .config
        .telegram
        .credentials()
        .ok_or(AppError::ConfigMissing)?;

    let form = parse_request(request, state.config.max_file_size).await?;

    let truck = TruckDetails::from_form(&form);
    let (Some(front), Some(back)) = (
        form.first_file(CARD_FRONT_FIELD),
        form.first_file(CARD_BACK_FIELD),
    ) else {
        tracing::info!(truck_id = %truck.id, "Upload rejected: card photo missing");
        return Err(AppError::MissingPhotos);
    };

    let order = relay_order(
        state.messenger.as_ref(),
        &credentials,
        &truck,
        front,
        back,
    )
    .await?;

    Ok(Json(UploadResponse {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        order_id: order.to_string(),
    }))
}
