/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// UPLOAD LIMITS
// =============================================================================

/// Maximum photo upload size in bytes (5 MiB)
pub const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

/// Maximum number of photos attached to a single report
pub const MAX_REPORT_PHOTOS: usize = 3;

/// Staged uploads are purged this many hours after creation
pub const STAGED_FILE_TTL_HOURS: i64 = 24;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Public relations role - triages incoming reports (approve/reject/assign)
pub const ROLE_PUBLIC_RELATIONS: &str = "Public Relations Officer";
