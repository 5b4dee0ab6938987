//! HTTP clients for the sibling services.

mod inventory;
mod payment;

pub use inventory::HttpInventoryClient;
pub use payment::HttpPaymentClient;
