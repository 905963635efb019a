/// Prefix every API route is mounted under
pub const API_PREFIX: &str = "/api/v1";

/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query value for `status` that disables the status filter
pub const STATUS_ALL: &str = "all";
