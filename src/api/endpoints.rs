//! API paths. The configured host must not end in `/api`; the prefix is part of
//! every path below.

/// Create an async job.
pub const JOBS_ASYNC: &str = "/api/v1/jobs/async";

/// List jobs.
pub const JOBS: &str = "/api/v1/jobs";

/// Single job path for get, update and delete.
pub fn job(id: &str) -> String {
    format!("{JOBS}/{}", urlencoding::encode(id))
}

/// List path filtered by exact job name.
pub fn jobs_by_name(name: &str) -> String {
    format!("{JOBS}?name={}", urlencoding::encode(name))
}

/// Update path carrying the rollback flag.
pub fn job_update(id: &str, rollback_enabled: bool) -> String {
    format!("{}?rollbackEnabled={rollback_enabled}", job(id))
}
