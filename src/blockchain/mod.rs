pub mod quorum;

pub use quorum::QuorumWalletManager;
