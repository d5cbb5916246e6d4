pub mod contract;
pub mod error;
pub mod msg;
pub mod state;

pub use crate::error::ServiceError;
pub use crate::state::{Session, SnapshotStore};
