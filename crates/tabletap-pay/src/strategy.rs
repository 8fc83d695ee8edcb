//! # Charge Lookup Strategies
//!
//! A charge lives in exactly one provider account scope, but historical data
//! does not always record which. The reconciler therefore walks an explicit
//! ordered plan instead of guessing:
//!
//! ```text
//! plan = [ Platform, Connected(acct) ]   (connected only when on file)
//!
//! for ctx in plan:
//!     retrieve_charge(ref, ctx)
//!       Found            ──► use this context for the refund
//!       NotFound         ──► try the next context
//!       any other error  ──► stop, surface it
//! ```

use tracing::debug;

use crate::provider::{AccountContext, ChargeProvider, ChargeState, ProviderError};
use tabletap_core::{PaymentIntentLink, RestaurantSettings};

/// A charge located in a specific account scope.
#[derive(Debug, Clone)]
pub struct LocatedCharge {
    pub context: AccountContext,
    pub state: ChargeState,
}

/// Builds the ordered lookup plan for a payment link.
///
/// Platform scope is always tried first; the connected scope is appended
/// when an account id is known, preferring the one recorded on the link
/// (the topology the charge was actually created under) over the current
/// settings.
pub fn lookup_plan(
    link: &PaymentIntentLink,
    settings: &RestaurantSettings,
) -> Vec<AccountContext> {
    let mut plan = vec![AccountContext::Platform];

    let connected = link
        .connected_account_id
        .as_deref()
        .or(settings.connected_account_id.as_deref());

    if let Some(account) = connected {
        plan.push(AccountContext::Connected(account.to_string()));
    }

    plan
}

/// Walks the plan until the charge is found.
///
/// Returns `Ok(None)` when every strategy reported NotFound; any other
/// provider error aborts the walk immediately.
pub async fn locate_charge<P: ChargeProvider>(
    provider: &P,
    charge_ref: &str,
    plan: &[AccountContext],
) -> Result<Option<LocatedCharge>, ProviderError> {
    for ctx in plan {
        match provider.retrieve_charge(charge_ref, ctx).await {
            Ok(state) => {
                debug!(charge_ref, context = %ctx, "charge located");
                return Ok(Some(LocatedCharge {
                    context: ctx.clone(),
                    state,
                }));
            }
            Err(ProviderError::NotFound(_)) => {
                debug!(charge_ref, context = %ctx, "charge not in this scope");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tabletap_core::{SettlementSchedule, TaxMode};

    fn link(connected: Option<&str>) -> PaymentIntentLink {
        PaymentIntentLink {
            id: "pl1".to_string(),
            order_id: "o1".to_string(),
            provider: "stripe".to_string(),
            charge_ref: "ch_1".to_string(),
            connected_account_id: connected.map(String::from),
            amount_cents: 5500,
            platform_fee_cents: 138,
            refunded: false,
            created_at: Utc::now(),
            finalized_at: None,
        }
    }

    fn settings(connected: Option<&str>) -> RestaurantSettings {
        let now = Utc::now();
        RestaurantSettings {
            restaurant_id: "r1".to_string(),
            tax_rate_bps: 1900,
            tax_mode: TaxMode::Inclusive,
            currency: "EUR".to_string(),
            accepts_cash: true,
            accepts_online: true,
            platform_fee_bps: 250,
            settlement_schedule: SettlementSchedule::Weekly,
            connected_account_id: connected.map(String::from),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_plan_without_connected_account() {
        let plan = lookup_plan(&link(None), &settings(None));
        assert_eq!(plan, vec![AccountContext::Platform]);
    }

    #[test]
    fn test_plan_prefers_account_recorded_on_link() {
        let plan = lookup_plan(&link(Some("acct_link")), &settings(Some("acct_settings")));
        assert_eq!(
            plan,
            vec![
                AccountContext::Platform,
                AccountContext::Connected("acct_link".to_string()),
            ]
        );
    }

    #[test]
    fn test_plan_falls_back_to_settings_account() {
        let plan = lookup_plan(&link(None), &settings(Some("acct_settings")));
        assert_eq!(
            plan,
            vec![
                AccountContext::Platform,
                AccountContext::Connected("acct_settings".to_string()),
            ]
        );
    }
}
