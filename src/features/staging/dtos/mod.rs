mod staged_file_dto;

pub use staged_file_dto::StagedFileDto;
