use api_auth::{SessionContext, SessionUser};
use common::error::{AppError, Res};
use db::{Store, models::catalog::Price};

use crate::{
    models::sub::BillingDecision,
    services::{
        pay::{CheckoutSessionRequest, PaymentsGateway},
        pending::{PendingAction, PendingActions},
    },
};

/// Checkout and billing portal flows for one request.
pub struct BillingFlows<'a> {
    pub gateway: &'a dyn PaymentsGateway,
    pub store: &'a dyn Store,
    pub pending: &'a PendingActions,
    /// Normalized site URL, with a trailing slash.
    pub site_url: &'a str,
}

fn still_loading() -> AppError {
    AppError::Unavailable("Your session is still loading, please try again".to_string())
}

impl BillingFlows<'_> {
    /// Decides where a click on a price's button leads.
    ///
    /// Signed out users go to the sign-in page and subscribed users to their
    /// account. Everyone else gets exactly one hosted checkout session for the
    /// price. The pending entry for the price lives until the function returns.
    pub async fn checkout(&self, session: &SessionContext, price_id: &str) -> Res<BillingDecision> {
        let active = match session {
            SessionContext::Absent => return Ok(BillingDecision::SignIn),
            SessionContext::Loading => return Err(still_loading()),
            SessionContext::Present(active) => active,
        };

        if active.subscription.is_some() {
            return Ok(BillingDecision::Account);
        }

        let _pending = self.pending.begin(
            active.user.id,
            PendingAction::Checkout {
                price_id: price_id.to_string(),
            },
        )?;

        let price = self
            .store
            .price(price_id)
            .await?
            .filter(Price::is_active)
            .ok_or_else(|| AppError::BadRequest(format!("Price {} is not available", price_id)))?;

        let customer_id = self.customer_for(&active.user).await?;
        let checkout = self
            .gateway
            .create_checkout_session(&CheckoutSessionRequest {
                customer_id,
                price_id: price.id,
                user_id: active.user.id,
                success_url: format!("{}account", self.site_url),
                cancel_url: self.site_url.to_string(),
            })
            .await?;

        log::info!(
            "Created checkout session {} for user {}",
            checkout.session_id,
            active.user.id
        );
        Ok(BillingDecision::HostedCheckout {
            session_id: checkout.session_id,
            url: checkout.url,
        })
    }

    /// Hosted billing portal link for a subscribed user.
    pub async fn portal(&self, session: &SessionContext) -> Res<BillingDecision> {
        let active = match session {
            SessionContext::Absent => return Ok(BillingDecision::SignIn),
            SessionContext::Loading => return Err(still_loading()),
            SessionContext::Present(active) => active,
        };

        if active.subscription.is_none() {
            return Ok(BillingDecision::Pricing);
        }

        let _pending = self.pending.begin(active.user.id, PendingAction::Portal)?;
        let customer_id = self.customer_for(&active.user).await?;
        let url = self
            .gateway
            .create_portal_session(&customer_id, &format!("{}account", self.site_url))
            .await?;

        Ok(BillingDecision::Portal { url })
    }

    /// Customer id of the user, created at the provider on first use.
    async fn customer_for(&self, user: &SessionUser) -> Res<String> {
        if let Some(customer_id) = self.store.stripe_customer_id(user.id).await? {
            return Ok(customer_id);
        }

        let customer_id = self
            .gateway
            .create_customer(user.email.as_deref(), user.id)
            .await?;
        self.store
            .save_stripe_customer_id(user.id, &customer_id)
            .await?;
        Ok(customer_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use api_auth::ActiveSession;
    use async_trait::async_trait;
    use chrono::Utc;
    use db::models::{catalog::ProductWithPrices, subscription::Subscription};
    use uuid::Uuid;

    use super::*;
    use crate::services::pay::HostedCheckout;

    const SITE: &str = "https://shop.test/";

    #[derive(Default)]
    struct FakeGateway {
        fail_checkout: bool,
        pending: Option<Arc<PendingActions>>,
        customers: Mutex<Vec<Uuid>>,
        checkouts: Mutex<Vec<CheckoutSessionRequest>>,
        portals: Mutex<Vec<(String, String)>>,
        pending_during_call: Mutex<Option<String>>,
    }

    #[async_trait]
    impl PaymentsGateway for FakeGateway {
        async fn create_customer(&self, _email: Option<&str>, user_id: Uuid) -> Res<String> {
            self.customers.lock().unwrap().push(user_id);
            Ok("cus_new".to_string())
        }

        async fn create_checkout_session(
            &self,
            req: &CheckoutSessionRequest,
        ) -> Res<HostedCheckout> {
            if let Some(pending) = &self.pending {
                *self.pending_during_call.lock().unwrap() = pending.pending_price(req.user_id);
            }
            self.checkouts.lock().unwrap().push(req.clone());
            if self.fail_checkout {
                return Err(AppError::Stripe(stripe::StripeError::ClientError(
                    "No such price: 'price_basic'".into(),
                )));
            }
            Ok(HostedCheckout {
                session_id: "cs_test_1".into(),
                url: "https://checkout.stripe.com/c/pay/cs_test_1".into(),
            })
        }

        async fn create_portal_session(&self, customer_id: &str, return_url: &str) -> Res<String> {
            self.portals
                .lock()
                .unwrap()
                .push((customer_id.to_string(), return_url.to_string()));
            Ok("https://billing.stripe.com/p/session/test".into())
        }
    }

    #[derive(Default)]
    struct FakeStore {
        prices: Vec<Price>,
        customer: Mutex<Option<String>>,
    }

    #[async_trait]
    impl Store for FakeStore {
        async fn active_products_with_prices(&self) -> Res<Vec<ProductWithPrices>> {
            Ok(vec![])
        }

        async fn price(&self, price_id: &str) -> Res<Option<Price>> {
            Ok(self.prices.iter().find(|p| p.id == price_id).cloned())
        }

        async fn current_subscription(&self, _user_id: Uuid) -> Res<Option<Subscription>> {
            Ok(None)
        }

        async fn stripe_customer_id(&self, _user_id: Uuid) -> Res<Option<String>> {
            Ok(self.customer.lock().unwrap().clone())
        }

        async fn save_stripe_customer_id(&self, _user_id: Uuid, customer_id: &str) -> Res<()> {
            *self.customer.lock().unwrap() = Some(customer_id.to_string());
            Ok(())
        }
    }

    fn price(id: &str, active: bool) -> Price {
        Price {
            id: id.to_string(),
            product_id: Some("prod_1".into()),
            active: Some(active),
            currency: Some("usd".into()),
            unit_amount: Some(1000),
            interval: Some("month".into()),
            interval_count: Some(1),
            trial_period_days: None,
            price_type: Some("recurring".into()),
        }
    }

    fn subscription(user_id: Uuid) -> Subscription {
        Subscription {
            id: "sub_1".into(),
            user_id,
            status: "active".into(),
            price_id: Some("price_basic".into()),
            quantity: Some(1),
            cancel_at_period_end: false,
            current_period_start: Utc::now(),
            current_period_end: Utc::now(),
            price: None,
        }
    }

    fn signed_in(subscribed: bool) -> SessionContext {
        let id = Uuid::new_v4();
        SessionContext::Present(ActiveSession {
            user: SessionUser {
                id,
                email: Some("ada@example.com".into()),
            },
            subscription: subscribed.then(|| subscription(id)),
        })
    }

    fn flows<'a>(
        gateway: &'a FakeGateway,
        store: &'a FakeStore,
        pending: &'a PendingActions,
    ) -> BillingFlows<'a> {
        BillingFlows {
            gateway,
            store,
            pending,
            site_url: SITE,
        }
    }

    #[actix_web::test]
    async fn absent_session_goes_to_signin_without_payments_calls() {
        let (gateway, store, pending) = (
            FakeGateway::default(),
            FakeStore::default(),
            PendingActions::new(),
        );
        let decision = flows(&gateway, &store, &pending)
            .checkout(&SessionContext::Absent, "price_basic")
            .await
            .unwrap();

        assert_eq!(decision, BillingDecision::SignIn);
        assert!(gateway.checkouts.lock().unwrap().is_empty());
        assert!(gateway.customers.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn subscribed_session_goes_to_account() {
        let gateway = FakeGateway::default();
        let store = FakeStore {
            prices: vec![price("price_basic", true)],
            ..Default::default()
        };
        let pending = PendingActions::new();
        let session = signed_in(true);

        let decision = flows(&gateway, &store, &pending)
            .checkout(&session, "price_basic")
            .await
            .unwrap();

        assert_eq!(decision, BillingDecision::Account);
        assert!(gateway.checkouts.lock().unwrap().is_empty());
        assert_eq!(pending.current(session.user().unwrap().id), None);
    }

    #[actix_web::test]
    async fn subscriber_goes_to_account_while_portal_is_pending() {
        let gateway = FakeGateway::default();
        let store = FakeStore::default();
        let pending = PendingActions::new();
        let session = signed_in(true);
        let user_id = session.user().unwrap().id;
        let _portal = pending.begin(user_id, PendingAction::Portal).unwrap();

        let decision = flows(&gateway, &store, &pending)
            .checkout(&session, "price_basic")
            .await
            .unwrap();

        assert_eq!(decision, BillingDecision::Account);
        assert!(pending.is_portal_pending(user_id));
        assert!(gateway.checkouts.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn unsubscribed_user_gets_exactly_one_checkout_session() {
        let pending = Arc::new(PendingActions::new());
        let gateway = FakeGateway {
            pending: Some(pending.clone()),
            ..Default::default()
        };
        let store = FakeStore {
            prices: vec![price("price_basic", true)],
            ..Default::default()
        };
        let session = signed_in(false);
        let user_id = session.user().unwrap().id;

        let decision = flows(&gateway, &store, &pending)
            .checkout(&session, "price_basic")
            .await
            .unwrap();

        assert_eq!(
            decision,
            BillingDecision::HostedCheckout {
                session_id: "cs_test_1".into(),
                url: "https://checkout.stripe.com/c/pay/cs_test_1".into(),
            }
        );
        let checkouts = gateway.checkouts.lock().unwrap();
        assert_eq!(checkouts.len(), 1);
        assert_eq!(checkouts[0].price_id, "price_basic");
        assert_eq!(checkouts[0].customer_id, "cus_new");
        assert_eq!(checkouts[0].success_url, "https://shop.test/account");
        assert_eq!(checkouts[0].cancel_url, "https://shop.test/");

        assert_eq!(
            gateway.pending_during_call.lock().unwrap().as_deref(),
            Some("price_basic")
        );
        assert_eq!(pending.current(user_id), None);
        assert_eq!(store.customer.lock().unwrap().as_deref(), Some("cus_new"));
    }

    #[actix_web::test]
    async fn existing_customer_is_reused() {
        let gateway = FakeGateway::default();
        let store = FakeStore {
            prices: vec![price("price_basic", true)],
            customer: Mutex::new(Some("cus_existing".into())),
        };
        let pending = PendingActions::new();

        flows(&gateway, &store, &pending)
            .checkout(&signed_in(false), "price_basic")
            .await
            .unwrap();

        assert!(gateway.customers.lock().unwrap().is_empty());
        assert_eq!(gateway.checkouts.lock().unwrap()[0].customer_id, "cus_existing");
    }

    #[actix_web::test]
    async fn failed_checkout_surfaces_error_and_clears_pending() {
        let gateway = FakeGateway {
            fail_checkout: true,
            ..Default::default()
        };
        let store = FakeStore {
            prices: vec![price("price_basic", true)],
            ..Default::default()
        };
        let pending = PendingActions::new();
        let session = signed_in(false);

        let err = flows(&gateway, &store, &pending)
            .checkout(&session, "price_basic")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Stripe(_)));
        assert!(err.to_string().contains("No such price: 'price_basic'"));
        assert_eq!(pending.current(session.user().unwrap().id), None);
    }

    #[actix_web::test]
    async fn inactive_or_unknown_price_is_rejected() {
        let gateway = FakeGateway::default();
        let store = FakeStore {
            prices: vec![price("price_old", false)],
            ..Default::default()
        };
        let pending = PendingActions::new();
        let flows = flows(&gateway, &store, &pending);
        let session = signed_in(false);

        for id in ["price_old", "price_missing"] {
            let err = flows.checkout(&session, id).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
        assert!(gateway.checkouts.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn loading_session_is_unavailable() {
        let (gateway, store, pending) = (
            FakeGateway::default(),
            FakeStore::default(),
            PendingActions::new(),
        );
        let flows = flows(&gateway, &store, &pending);

        assert!(matches!(
            flows.checkout(&SessionContext::Loading, "price_basic").await,
            Err(AppError::Unavailable(_))
        ));
        assert!(matches!(
            flows.portal(&SessionContext::Loading).await,
            Err(AppError::Unavailable(_))
        ));
    }

    #[actix_web::test]
    async fn concurrent_request_of_same_user_conflicts() {
        let gateway = FakeGateway::default();
        let store = FakeStore {
            prices: vec![price("price_basic", true)],
            ..Default::default()
        };
        let pending = PendingActions::new();
        let session = signed_in(false);
        let _in_flight = pending
            .begin(session.user().unwrap().id, PendingAction::Portal)
            .unwrap();

        let err = flows(&gateway, &store, &pending)
            .checkout(&session, "price_basic")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert!(gateway.checkouts.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn portal_without_subscription_goes_to_pricing() {
        let (gateway, store, pending) = (
            FakeGateway::default(),
            FakeStore::default(),
            PendingActions::new(),
        );
        let flows = flows(&gateway, &store, &pending);

        assert_eq!(
            flows.portal(&signed_in(false)).await.unwrap(),
            BillingDecision::Pricing
        );
        assert_eq!(
            flows.portal(&SessionContext::Absent).await.unwrap(),
            BillingDecision::SignIn
        );
        assert!(gateway.portals.lock().unwrap().is_empty());
        assert!(gateway.customers.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn portal_returns_to_account() {
        let gateway = FakeGateway::default();
        let store = FakeStore {
            customer: Mutex::new(Some("cus_existing".into())),
            ..Default::default()
        };
        let pending = PendingActions::new();
        let session = signed_in(true);

        let decision = flows(&gateway, &store, &pending)
            .portal(&session)
            .await
            .unwrap();

        assert_eq!(
            decision,
            BillingDecision::Portal {
                url: "https://billing.stripe.com/p/session/test".into()
            }
        );
        assert_eq!(
            gateway.portals.lock().unwrap().as_slice(),
            &[(
                "cus_existing".to_string(),
                "https://shop.test/account".to_string()
            )]
        );
        assert!(!pending.is_portal_pending(session.user().unwrap().id));
    }
}
