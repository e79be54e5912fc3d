/// Where the browser goes after a billing request.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingDecision {
    /// No session, sign in first.
    SignIn,
    /// Already subscribed, manage the plan from the account page.
    Account,
    /// Nothing to manage yet, pick a plan.
    Pricing,
    HostedCheckout { session_id: String, url: String },
    Portal { url: String },
}

impl BillingDecision {
    /// Absolute provider URL or a local route.
    pub fn location(&self) -> &str {
        match self {
            BillingDecision::SignIn => "/signin",
            BillingDecision::Account => "/account",
            BillingDecision::Pricing => "/pricing",
            BillingDecision::HostedCheckout { url, .. } => url,
            BillingDecision::Portal { url } => url,
        }
    }
}
