pub mod config;
pub mod domain;
pub mod errors;
pub mod logger;
pub mod units;

pub use config::AssetsConfig;
pub use errors::WalletError;
pub use logger::AssetsLogger;
