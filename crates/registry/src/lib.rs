pub mod store;

pub use store::{JobStore, JobStoreError};
