mod officer_repository;
mod role_repository;

pub use officer_repository::{OfficerRepository, PgOfficerRepository};
pub use role_repository::{PgRoleRepository, RoleRepository};
