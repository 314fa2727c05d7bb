pub mod catalog;
pub mod clients;
pub mod credit;
pub mod orders;
