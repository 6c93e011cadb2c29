pub mod config;
pub mod error;
pub mod feature_set;
pub mod job;
pub mod lookup;
pub mod runner;
pub mod snapshot;
pub mod source;
pub mod status;
pub mod store;

pub use config::Config;
pub use error::*;
pub use feature_set::{FeatureSet, FeatureSetRef, FeatureSetSpec, FeatureSetStatus, FieldSpec, ValueType};
pub use job::{FeatureSetJobStatus, JobRecord};
pub use lookup::{EntityCatalog, EntityLookup};
pub use runner::RunnerKind;
pub use snapshot::*;
pub use source::{Source, SourceConfig, SourceKind, SourceRef};
pub use status::{DeliveryStatus, IngestionJobStatus, JobStatus};
pub use store::{Store, StoreConfig, StoreKind, StoreRef, Subscription};
