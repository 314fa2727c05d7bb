//! Client records and the lookup probe table.
//!
//! The upstream schema is inconsistent about table and column casing, so a
//! client record may live under any of a fixed set of table/column
//! combinations. The probe order below is load-bearing: lookups walk it
//! top-down and the first non-empty result wins.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

/// One table/column combination a client record may live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientProbe {
    pub table: &'static str,
    pub username_col: &'static str,
    pub balance_col: &'static str,
    pub expiry_col: &'static str,
}

/// Ordered lookup sequence. First hit wins; nothing is cached across calls.
pub static CLIENT_PROBES: [ClientProbe; 5] = [
    ClientProbe {
        table: "clients",
        username_col: "username",
        balance_col: "credits",
        expiry_col: "credits_expiry",
    },
    ClientProbe {
        table: "clients",
        username_col: "USERNAME",
        balance_col: "CREDITS",
        expiry_col: "CREDITS_EXPIRY",
    },
    ClientProbe {
        table: "clients",
        username_col: "Username",
        balance_col: "Credits",
        expiry_col: "CreditsExpiry",
    },
    ClientProbe {
        table: "userfile",
        username_col: "username",
        balance_col: "credits",
        expiry_col: "credits_expiry",
    },
    ClientProbe {
        table: "userfile",
        username_col: "USERNAME",
        balance_col: "CREDITS",
        expiry_col: "CREDITS_EXPIRY",
    },
];

/// A client row together with the probe that located it, so follow-up
/// mutations target the authoritative location instead of guessing again.
#[derive(Debug, Clone)]
pub struct LocatedClient {
    pub probe: &'static ClientProbe,
    pub row: Value,
}

impl LocatedClient {
    pub fn username(&self) -> Option<&str> {
        self.row.get(self.probe.username_col).and_then(Value::as_str)
    }

    /// Current credit balance; missing or malformed values read as zero.
    pub fn balance(&self) -> Decimal {
        self.row
            .get(self.probe.balance_col)
            .and_then(decimal_from_value)
            .unwrap_or_default()
    }

    pub fn expiry(&self) -> Option<NaiveDate> {
        self.row
            .get(self.probe.expiry_col)
            .and_then(Value::as_str)
            .and_then(parse_date)
    }
}

/// Upstream numeric columns arrive as JSON numbers or strings depending on
/// the column type; accept both.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Dates arrive either as `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
