//! TRUE asset adapter for an OpenWallet-style wallet host.
//!
//! - [`openw`]: the adapter capability traits and the asset registry
//! - [`blockchain::quorum`]: the EVM wallet manager doing the chain work
//! - [`truechain`]: the TRUE adapter wrapping it
//! - [`service`]: registration hook and the host transaction service

pub mod blockchain;
pub mod core;
pub mod openw;
pub mod service;
pub mod truechain;

pub use crate::core::{AssetsConfig, AssetsLogger, WalletError};
pub use crate::openw::{AssetsAdapter, AssetsRegistry};
pub use crate::truechain::TrueWalletManager;
