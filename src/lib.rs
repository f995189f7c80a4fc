//! Token migration engine library.

pub mod registry;
pub mod token;
pub mod config;
pub mod rpc;
pub mod wallet;
pub mod discovery;
pub mod bundle;
pub mod exec;
pub mod session;
pub mod resilience;

pub use config::MigratorConfig;
pub use session::{ConfirmationGate, MigrationSession};
