use api_auth::{ActiveSession, SessionContext, misc::oauth::OAuthProvider};
use api_subs::PendingActions;
use askama::Template;
use db::models::catalog::ProductWithPrices;

use crate::{
    misc::format::format_price,
    views::nav::{Layout, nav_items},
};

const INTERVALS: [(&str, &str); 4] = [
    ("day", "Daily billing"),
    ("week", "Weekly billing"),
    ("month", "Monthly billing"),
    ("year", "Yearly billing"),
];
const DEFAULT_INTERVAL: &str = "month";

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub layout: Layout,
}

/// Shown while the session could not be resolved; the page refreshes itself.
#[derive(Template)]
#[template(path = "loading.html")]
pub struct LoadingPage {
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTab {
    pub name: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceCard {
    pub price_id: String,
    pub product_name: String,
    pub description: Option<String>,
    pub amount: String,
    pub interval: String,
    /// `Manage` for the subscribed price, `Subscribe` otherwise.
    pub label: &'static str,
    pub pending: bool,
}

#[derive(Template)]
#[template(path = "pricing.html")]
pub struct PricingPage {
    pub layout: Layout,
    pub intervals: Vec<IntervalTab>,
    pub cards: Vec<PriceCard>,
    pub empty: bool,
    /// Buttons are inert until the session is known.
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderButton {
    pub slug: &'static str,
    pub label: &'static str,
}

#[derive(Template)]
#[template(path = "signin.html")]
pub struct SignInPage {
    pub layout: Layout,
    pub providers: Vec<ProviderButton>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummary {
    pub product_name: String,
    pub amount: String,
    pub interval: String,
}

#[derive(Template)]
#[template(path = "account.html")]
pub struct AccountPage {
    pub layout: Layout,
    pub email: String,
    pub plan: Option<PlanSummary>,
    pub portal_disabled: bool,
    pub portal_pending: bool,
}

pub fn home_page(session: &SessionContext) -> HomePage {
    HomePage {
        layout: Layout::new("Storefront", session),
    }
}

pub fn loading_page(title: &str) -> LoadingPage {
    LoadingPage {
        layout: Layout::new(title, &SessionContext::Loading),
    }
}

/// Billing interval to show: the requested one when it has prices, else
/// monthly, else the first one available.
pub fn select_interval<'a>(available: &[&'a str], requested: Option<&str>) -> Option<&'a str> {
    requested
        .and_then(|r| available.iter().find(|a| **a == r))
        .or_else(|| available.iter().find(|a| **a == DEFAULT_INTERVAL))
        .or_else(|| available.first())
        .copied()
}

pub fn pricing_page(
    products: &[ProductWithPrices],
    requested_interval: Option<&str>,
    session: &SessionContext,
    pending: &PendingActions,
) -> PricingPage {
    let available: Vec<&str> = INTERVALS
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| {
            products.iter().any(|p| {
                p.prices
                    .iter()
                    .any(|price| price.is_active() && price.interval.as_deref() == Some(*name))
            })
        })
        .collect();
    let selected = select_interval(&available, requested_interval);

    let subscribed_price = session.subscription().and_then(|s| s.price_id.as_deref());
    let pending_price = session.user().and_then(|u| pending.pending_price(u.id));

    let cards: Vec<PriceCard> = match selected {
        None => vec![],
        Some(interval) => products
            .iter()
            .flat_map(|product| {
                product
                    .prices
                    .iter()
                    .filter(move |price| {
                        price.is_active() && price.interval.as_deref() == Some(interval)
                    })
                    .map(move |price| (product, price))
            })
            .map(|(product, price)| PriceCard {
                price_id: price.id.clone(),
                product_name: product.name.clone().unwrap_or_default(),
                description: product.description.clone(),
                amount: format_price(
                    price.currency.as_deref().unwrap_or("usd"),
                    price.unit_amount,
                ),
                interval: interval.to_string(),
                label: if subscribed_price == Some(price.id.as_str()) {
                    "Manage"
                } else {
                    "Subscribe"
                },
                pending: pending_price.as_deref() == Some(price.id.as_str()),
            })
            .collect(),
    };

    let intervals = INTERVALS
        .iter()
        .filter(|(name, _)| available.contains(name))
        .map(|(name, label)| IntervalTab {
            name: name.to_string(),
            label: label.to_string(),
            selected: Some(*name) == selected,
        })
        .collect();

    PricingPage {
        layout: Layout::new("Pricing", session),
        intervals,
        empty: cards.is_empty(),
        cards,
        disabled: session.is_loading(),
    }
}

fn notice_text(code: &str) -> Option<String> {
    match code {
        "check_email" => Some("Check your email for the magic link.".to_string()),
        "signed_out" => Some("You have been signed out.".to_string()),
        _ => None,
    }
}

pub fn signin_page(
    providers: &[String],
    notice: Option<&str>,
    error: Option<&str>,
) -> SignInPage {
    SignInPage {
        layout: Layout::new("Sign in", &SessionContext::Absent),
        providers: OAuthProvider::from_config(providers)
            .into_iter()
            .map(|p| ProviderButton {
                slug: p.as_str(),
                label: p.label(),
            })
            .collect(),
        notice: notice.and_then(notice_text),
        error: error.map(str::to_string),
    }
}

pub fn account_page(active: &ActiveSession, pending: &PendingActions) -> AccountPage {
    let plan = active.subscription.as_ref().map(|subscription| {
        let price = subscription.price.as_ref();
        PlanSummary {
            product_name: price
                .and_then(|p| p.product_name.clone())
                .unwrap_or_default(),
            amount: format_price(
                price.and_then(|p| p.currency.as_deref()).unwrap_or("usd"),
                price.and_then(|p| p.unit_amount),
            ),
            interval: price.and_then(|p| p.interval.clone()).unwrap_or_default(),
        }
    });
    let portal_pending = pending.is_portal_pending(active.user.id);

    AccountPage {
        layout: Layout {
            title: "Account".to_string(),
            items: nav_items(),
            signed_in: true,
            loading: false,
        },
        email: active.user.email.clone().unwrap_or_default(),
        portal_disabled: plan.is_none() || portal_pending,
        plan,
        portal_pending,
    }
}
