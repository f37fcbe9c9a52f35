mod staging_service;

pub use staging_service::{PromoteMove, StagingBuckets, StagingService};
