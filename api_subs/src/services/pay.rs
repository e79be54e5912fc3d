use std::collections::HashMap;

use async_trait::async_trait;
use common::error::{AppError, Res};
use stripe::{
    BillingPortalSession, CheckoutSession, CheckoutSessionBillingAddressCollection,
    CheckoutSessionMode, Client, CreateBillingPortalSession, CreateCheckoutSession,
    CreateCustomer, Customer, CustomerId,
};
use uuid::Uuid;

/// What the payments provider needs to open a hosted checkout page.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionRequest {
    pub customer_id: String,
    pub price_id: String,
    pub user_id: Uuid,
    pub success_url: String,
    pub cancel_url: String,
}

/// Identifier and hosted URL of a created checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct HostedCheckout {
    pub session_id: String,
    pub url: String,
}

/// The payments provider, reduced to the calls the storefront makes.
#[async_trait]
pub trait PaymentsGateway: Send + Sync {
    /// Creates a customer and returns its id.
    async fn create_customer(&self, email: Option<&str>, user_id: Uuid) -> Res<String>;

    async fn create_checkout_session(&self, req: &CheckoutSessionRequest) -> Res<HostedCheckout>;

    /// Returns the URL of a hosted billing portal session.
    async fn create_portal_session(&self, customer_id: &str, return_url: &str) -> Res<String>;
}

pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    pub fn new(client: Client) -> Self {
        StripeGateway { client }
    }
}

fn parse_customer_id(customer_id: &str) -> Res<CustomerId> {
    customer_id.parse::<CustomerId>().map_err(|e| {
        AppError::Internal(format!(
            "Failed to parse customer id: {}. {}",
            customer_id, e
        ))
    })
}

#[async_trait]
impl PaymentsGateway for StripeGateway {
    async fn create_customer(&self, email: Option<&str>, user_id: Uuid) -> Res<String> {
        let metadata = HashMap::from([("supabaseUUID".to_string(), user_id.to_string())]);
        let params = CreateCustomer {
            email,
            metadata: Some(metadata),
            ..Default::default()
        };

        let customer = Customer::create(&self.client, params)
            .await
            .map_err(AppError::from)?;
        log::info!("Created payments customer {} for user {}", customer.id, user_id);
        Ok(customer.id.to_string())
    }

    /// Subscription-mode session for a single unit of the price. Billing
    /// address is required and promotion codes are accepted.
    async fn create_checkout_session(&self, req: &CheckoutSessionRequest) -> Res<HostedCheckout> {
        let client_reference_id = req.user_id.to_string();
        let params = CreateCheckoutSession {
            payment_method_types: Some(vec![
                stripe::CreateCheckoutSessionPaymentMethodTypes::Card,
            ]),
            billing_address_collection: Some(CheckoutSessionBillingAddressCollection::Required),
            line_items: Some(vec![stripe::CreateCheckoutSessionLineItems {
                price: Some(req.price_id.clone()),
                quantity: Some(1),
                ..Default::default()
            }]),
            mode: Some(CheckoutSessionMode::Subscription),
            allow_promotion_codes: Some(true),
            success_url: Some(req.success_url.as_str()),
            cancel_url: Some(req.cancel_url.as_str()),
            customer: Some(parse_customer_id(&req.customer_id)?),
            client_reference_id: Some(client_reference_id.as_str()),
            ..Default::default()
        };

        let session = CheckoutSession::create(&self.client, params)
            .await
            .map_err(AppError::from)?;
        let url = session.url.ok_or_else(|| {
            AppError::Internal(format!("Checkout session {} has no hosted url", session.id))
        })?;

        Ok(HostedCheckout {
            session_id: session.id.to_string(),
            url,
        })
    }

    async fn create_portal_session(&self, customer_id: &str, return_url: &str) -> Res<String> {
        let mut params = CreateBillingPortalSession::new(parse_customer_id(customer_id)?);
        params.return_url = Some(return_url);

        let session = BillingPortalSession::create(&self.client, params)
            .await
            .map_err(AppError::from)?;
        Ok(session.url)
    }
}
