use crate::models::{CardSide, OrderReference, TruckDetails, alert_message, photo_caption};
use crate::services::form::UploadedFile;
use crate::services::telegram::{Messenger, ParseMode, TelegramCredentials, TelegramError};
use tracing::{info, warn};

/// Sends the order alert followed by the front and back card photos.
///
/// Each send completes before the next one starts. The first failure aborts the
/// sequence; messages already delivered are not recalled.
pub async fn relay_order(
    messenger: &dyn Messenger,
    credentials: &TelegramCredentials,
    truck: &TruckDetails,
    front: &UploadedFile,
    back: &UploadedFile,
) -> Result<OrderReference, TelegramError> {
    let order = OrderReference::now();
    info!(order_id = %order, truck_id = %truck.id, "Relaying card photos to Telegram");

    messenger
        .send_text(credentials, &alert_message(truck, &order), ParseMode::Markdown)
        .await?;

    for (side, photo) in [(CardSide::Front, front), (CardSide::Back, back)] {
        let caption = photo_caption(&order, side, &truck.name);
        if let Err(e) = messenger.send_photo(credentials, photo, &caption).await {
            warn!(
                order_id = %order,
                field = side.field_name(),
                "Photo send failed after the order alert was delivered"
            );
            return Err(e);
        }
    }

    info!(order_id = %order, "Order alert and photos delivered");
    Ok(order)
}
