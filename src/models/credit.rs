//! Credit-ledger boundary types.
//!
//! The upstream `add_credit_ledger` stored procedure takes single-character
//! codes for payment method, transaction type, agent, and status. Those codes
//! exist only at the RPC edge; everything inside the service works with the
//! tagged enums below, validated when a request enters the system.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Credit,
    /// Sentinel for unrecognized inbound values.
    Unknown,
}

impl PaymentMethod {
    /// Lenient parse: unrecognized strings fall to the sentinel, matching the
    /// ledger procedure's expectations.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("cash") => Self::Cash,
            Some("bank_transfer") => Self::BankTransfer,
            Some("credit") | Some("credit_card") => Self::Credit,
            _ => Self::Unknown,
        }
    }

    pub fn wire_code(self) -> char {
        match self {
            Self::Cash => 'C',
            Self::BankTransfer => 'B',
            Self::Credit => 'K',
            Self::Unknown => 'O',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionType {
    TopUp,
    Purchase,
}

impl TransactionType {
    /// Strict parse: the transaction type branches the whole pipeline, so an
    /// unrecognized value is a client error rather than a sentinel.
    pub fn parse_strict(raw: &str) -> Result<Self, ServiceError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "TOP_UP" | "TOPUP" => Ok(Self::TopUp),
            "PURCHASE" => Ok(Self::Purchase),
            other => Err(ServiceError::ValidationError(format!(
                "unknown transaction_type '{}'; expected TOP_UP or PURCHASE",
                other
            ))),
        }
    }

    pub fn wire_code(self) -> char {
        match self {
            Self::TopUp => 'T',
            Self::Purchase => 'P',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LedgerAgent {
    Admin,
    System,
    Unknown,
}

impl LedgerAgent {
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("admin") => Self::Admin,
            Some("system") => Self::System,
            _ => Self::Unknown,
        }
    }

    pub fn wire_code(self) -> char {
        match self {
            Self::Admin => 'A',
            Self::System => 'S',
            Self::Unknown => 'U',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LedgerStatus {
    Completed,
    Pending,
}

impl LedgerStatus {
    pub fn wire_code(self) -> char {
        match self {
            Self::Completed => 'C',
            Self::Pending => 'P',
        }
    }
}

/// Body of `POST /api/client/credit-topup`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreditMutationRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    pub amount: Decimal,
    /// Calendar days added to the expiry on a top-up.
    #[serde(default)]
    pub days: Option<i64>,
    #[serde(default)]
    pub payment_method: Option<String>,
    pub transaction_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
}

/// Successful outcome of the credit pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct CreditMutationOutcome {
    pub username: String,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub new_balance: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_expiry: Option<NaiveDate>,
    /// Whether the client row was patched to match the ledger.
    pub balance_patched: bool,
    /// Set when the ledger entry committed but the balance patch could not
    /// be confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
