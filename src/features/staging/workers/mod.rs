mod staging_sweeper;

pub use staging_sweeper::StagingSweeper;
