use crate::{dtos::sub::RedirectResponse, models::sub::BillingDecision};

/// Page scripts follow `redirect`; `sessionId` is null unless a hosted
/// checkout was created.
impl From<BillingDecision> for RedirectResponse {
    fn from(decision: BillingDecision) -> Self {
        let redirect = decision.location().to_string();
        let session_id = match decision {
            BillingDecision::HostedCheckout { session_id, .. } => Some(session_id),
            _ => None,
        };
        RedirectResponse {
            redirect,
            session_id,
        }
    }
}
