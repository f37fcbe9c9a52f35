mod report_dto;

pub use report_dto::{ActorContext, CreateReportDto, ReportResponseDto, UpdateReportStatusDto};
