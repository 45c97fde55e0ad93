pub mod aggregate;

pub use aggregate::{OfferCode, RemnantRecord};
