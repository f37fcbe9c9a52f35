mod staged_file_repository;

pub use staged_file_repository::{PgStagedFileRepository, StagedFileRepository};
