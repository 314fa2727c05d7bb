pub mod client;
pub mod credit;
pub mod order;

pub use client::{ClientProbe, LocatedClient, CLIENT_PROBES};
pub use credit::{LedgerAgent, LedgerStatus, PaymentMethod, TransactionType};
