pub mod service;

pub use service::{reconcile_prices, reconcile_stocks};
