//! Credit-ledger mutation pipeline.
//!
//! Linear five-step flow: validate, locate the client, compute the new
//! balance and expiry, write the immutable ledger entry through the
//! `add_credit_ledger` stored procedure, then patch the client row. The
//! patch carries an optimistic precondition on the balance that was read, so
//! concurrent mutations against the same client re-read and re-derive
//! instead of overwriting each other.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::models::client::decimal_from_value;
use crate::models::credit::{CreditMutationOutcome, CreditMutationRequest};
use crate::models::{LedgerAgent, LedgerStatus, LocatedClient, PaymentMethod, TransactionType};
use crate::services::clients::ClientService;
use crate::supabase::{eq, SupabaseClient};
use validator::Validate;

/// Attempts for the optimistically-guarded balance patch. The ledger entry
/// is already committed by the time the patch runs, so exhausting these
/// degrades to a warning rather than an error.
const BALANCE_PATCH_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct CreditService {
    supabase: Arc<SupabaseClient>,
    clients: Arc<ClientService>,
}

impl CreditService {
    pub fn new(supabase: Arc<SupabaseClient>, clients: Arc<ClientService>) -> Self {
        Self { supabase, clients }
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn apply(
        &self,
        request: CreditMutationRequest,
    ) -> Result<CreditMutationOutcome, ServiceError> {
        request.validate()?;
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "amount must be a positive number".into(),
            ));
        }
        let transaction_type = TransactionType::parse_strict(&request.transaction_type)?;
        let days = request.days.unwrap_or(0);
        if days < 0 {
            return Err(ServiceError::ValidationError(
                "days must not be negative".into(),
            ));
        }

        let located = self.clients.find_by_username(&request.username).await?;
        let balance = located.balance();

        if transaction_type == TransactionType::Purchase && balance < request.amount {
            return Err(ServiceError::InsufficientCredit(format!(
                "balance {} is below purchase amount {}",
                balance, request.amount
            )));
        }

        let today = Utc::now().date_naive();
        let new_balance = apply_amount(balance, request.amount, transaction_type);
        let new_expiry = match transaction_type {
            TransactionType::TopUp => Some(extend_expiry(located.expiry(), today, days)),
            TransactionType::Purchase => None,
        };

        self.write_ledger(&request, transaction_type).await?;

        let patch = self
            .patch_balance(&located, transaction_type, request.amount, days, today)
            .await;

        let (balance_patched, settled_balance, settled_expiry, warning) = match patch {
            PatchOutcome::Patched { balance, expiry } => (true, balance, expiry, None),
            PatchOutcome::Unconfirmed { reason } => {
                warn!(
                    username = %request.username,
                    reason = %reason,
                    "ledger entry committed but balance patch unconfirmed"
                );
                (
                    false,
                    new_balance,
                    new_expiry,
                    Some(format!(
                        "ledger entry committed but balance patch unconfirmed: {}",
                        reason
                    )),
                )
            }
        };

        info!(
            username = %request.username,
            transaction = %transaction_type,
            amount = %request.amount,
            new_balance = %settled_balance,
            patched = balance_patched,
            "credit mutation applied"
        );

        Ok(CreditMutationOutcome {
            username: request.username,
            transaction_type,
            amount: request.amount,
            new_balance: settled_balance,
            new_expiry: settled_expiry,
            balance_patched,
            warning,
        })
    }

    /// Step 4: immutable ledger entry via the REST-RPC bridge, with the
    /// single-character wire codes the procedure expects.
    async fn write_ledger(
        &self,
        request: &CreditMutationRequest,
        transaction_type: TransactionType,
    ) -> Result<(), ServiceError> {
        let method = PaymentMethod::parse_lenient(request.payment_method.as_deref());
        let agent = LedgerAgent::parse_lenient(request.agent.as_deref());
        let args = json!({
            "p_username": request.username,
            "p_amount": request.amount.to_string(),
            "p_method": method.wire_code().to_string(),
            "p_type": transaction_type.wire_code().to_string(),
            "p_agent": agent.wire_code().to_string(),
            "p_status": LedgerStatus::Completed.wire_code().to_string(),
            "p_description": request.description.clone().unwrap_or_default(),
        });
        self.supabase.rpc("add_credit_ledger", &args).await?;
        Ok(())
    }

    /// Step 5: patch the client row at the location the lookup probe found,
    /// guarded by `balance = eq.<value read>`. An empty patch result means
    /// another writer got there first; re-read and re-derive from the fresh
    /// row, a bounded number of times.
    async fn patch_balance(
        &self,
        located: &LocatedClient,
        transaction_type: TransactionType,
        amount: Decimal,
        days: i64,
        today: NaiveDate,
    ) -> PatchOutcome {
        let probe = located.probe;
        let username = match located.username() {
            Some(u) => u.to_string(),
            None => {
                return PatchOutcome::Unconfirmed {
                    reason: "located row has no username column".into(),
                }
            }
        };

        let mut expected_balance = located.balance();
        let mut current_expiry = located.expiry();

        for attempt in 1..=BALANCE_PATCH_ATTEMPTS {
            let new_balance = apply_amount(expected_balance, amount, transaction_type);
            let mut body = json!({ probe.balance_col: new_balance.to_string() });
            // A purchase never reports or touches the expiry column.
            let new_expiry = match transaction_type {
                TransactionType::TopUp => {
                    let expiry = extend_expiry(current_expiry, today, days);
                    body[probe.expiry_col] = json!(expiry.format("%Y-%m-%d").to_string());
                    Some(expiry)
                }
                TransactionType::Purchase => None,
            };

            let filters = [
                eq(probe.username_col, &username),
                eq(probe.balance_col, expected_balance),
            ];
            match self.supabase.patch(probe.table, &filters, &body).await {
                Ok(rows) if !rows.is_empty() => {
                    return PatchOutcome::Patched {
                        balance: new_balance,
                        expiry: new_expiry,
                    };
                }
                Ok(_) => {
                    warn!(
                        attempt,
                        username = %username,
                        expected = %expected_balance,
                        "balance precondition missed, re-reading"
                    );
                }
                Err(err) => {
                    // Non-fatal: the ledger entry is already committed.
                    return PatchOutcome::Unconfirmed {
                        reason: err.to_string(),
                    };
                }
            }

            // Re-read the row the probe originally located.
            let fresh = self
                .supabase
                .select(probe.table, &[eq(probe.username_col, &username)])
                .await;
            match fresh {
                Ok(rows) => match rows.into_iter().next() {
                    Some(row) => {
                        expected_balance = row
                            .get(probe.balance_col)
                            .and_then(decimal_from_value)
                            .unwrap_or_default();
                        current_expiry = row
                            .get(probe.expiry_col)
                            .and_then(Value::as_str)
                            .and_then(crate::models::client::parse_date);
                        // A concurrent writer may have spent the balance
                        // down; a purchase must never patch it negative.
                        if transaction_type == TransactionType::Purchase
                            && expected_balance < amount
                        {
                            return PatchOutcome::Unconfirmed {
                                reason: format!(
                                    "balance dropped to {} below purchase amount {}",
                                    expected_balance, amount
                                ),
                            };
                        }
                    }
                    None => {
                        return PatchOutcome::Unconfirmed {
                            reason: "client row disappeared during patch".into(),
                        }
                    }
                },
                Err(err) => {
                    return PatchOutcome::Unconfirmed {
                        reason: err.to_string(),
                    }
                }
            }
        }

        PatchOutcome::Unconfirmed {
            reason: format!(
                "balance precondition missed {} times",
                BALANCE_PATCH_ATTEMPTS
            ),
        }
    }
}

enum PatchOutcome {
    Patched {
        balance: Decimal,
        expiry: Option<NaiveDate>,
    },
    Unconfirmed {
        reason: String,
    },
}

fn apply_amount(balance: Decimal, amount: Decimal, transaction_type: TransactionType) -> Decimal {
    match transaction_type {
        TransactionType::TopUp => balance + amount,
        TransactionType::Purchase => balance - amount,
    }
}

/// A past expiry resets the baseline to today before the extension is added.
fn extend_expiry(current: Option<NaiveDate>, today: NaiveDate, days: i64) -> NaiveDate {
    let baseline = match current {
        Some(expiry) if expiry > today => expiry,
        _ => today,
    };
    baseline + chrono::Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn top_up_adds_and_purchase_subtracts() {
        assert_eq!(
            apply_amount(dec!(100), dec!(25), TransactionType::TopUp),
            dec!(125)
        );
        assert_eq!(
            apply_amount(dec!(100), dec!(25), TransactionType::Purchase),
            dec!(75)
        );
    }

    #[test]
    fn future_expiry_is_extended_in_place() {
        let today = date(2026, 8, 30);
        let current = Some(date(2026, 9, 10));
        assert_eq!(extend_expiry(current, today, 30), date(2026, 10, 10));
    }

    #[test]
    fn past_expiry_resets_baseline_to_today() {
        let today = date(2026, 8, 30);
        let current = Some(date(2026, 1, 1));
        assert_eq!(extend_expiry(current, today, 30), date(2026, 9, 29));
    }

    #[test]
    fn missing_expiry_uses_today_as_baseline() {
        let today = date(2026, 8, 30);
        assert_eq!(extend_expiry(None, today, 7), date(2026, 9, 6));
    }
}
