pub mod config;
pub mod error;
pub mod logging;
pub mod replay;
pub mod review;
pub mod store;

pub use config::Config;
pub use error::{ReplayError, ReviewError, StoreError};
pub use review::{ReviewInput, ReviewOutcome, ReviewService};
pub use store::{InMemoryProgressStore, ProgressKey, ProgressStore, VersionedState};
