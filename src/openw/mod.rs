//! Host-facing surface: the adapter capability set and the asset registry.

pub mod adapter;
pub mod registry;

pub use adapter::{
    AddressDecoder, AssetsAdapter, BlockScanner, SmartContractDecoder, TransactionDecoder,
};
pub use registry::AssetsRegistry;
