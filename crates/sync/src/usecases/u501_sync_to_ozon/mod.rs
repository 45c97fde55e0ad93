pub mod executor;
pub mod ozon_api_client;

pub use executor::SyncExecutor;
