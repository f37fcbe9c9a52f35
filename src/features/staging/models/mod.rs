mod staged_file;

pub use staged_file::{StagedFile, UploadCategory};
