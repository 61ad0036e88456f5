//! Configuration: `Settings` loaded from `<home>/config.toml`.

pub mod settings;

pub use settings::{default_home, ProviderKind, Settings, Validation};
