pub mod dtos;
pub mod models;
pub mod repositories;
pub mod services;
pub mod workers;

pub use services::{PromoteMove, StagingBuckets, StagingService};
pub use workers::StagingSweeper;
