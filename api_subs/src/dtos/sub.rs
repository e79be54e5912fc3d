use serde::{Deserialize, Serialize};

/// Body of `POST /api/create-checkout-session`. Only the price id is read,
/// the rest of the price object the page posts is ignored.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub price: PriceRef,
}

#[derive(Debug, Deserialize)]
pub struct PriceRef {
    pub id: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedirectResponse {
    pub redirect: String,
    pub session_id: Option<String>,
}
