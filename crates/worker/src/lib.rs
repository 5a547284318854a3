//! Background reconciliation for the Wayside marketplace: polls the
//! payment gateway for settlement of accepted proposals and closes
//! lapsed subscriptions.

pub mod settlement;

pub use settlement::SettlementPoller;
