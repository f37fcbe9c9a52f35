pub mod model;
pub mod repository;

pub use model::Citizen;
pub use repository::{CitizenRepository, PgCitizenRepository};
