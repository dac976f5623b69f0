pub mod assets;
pub mod bootstrap;

pub use assets::AssetsService;
pub use bootstrap::{create_registry, register_assets};
