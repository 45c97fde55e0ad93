pub mod a001_remnant;
pub mod a002_reconcile;
