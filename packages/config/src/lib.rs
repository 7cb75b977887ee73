// ABOUTME: Shared configuration names and default values
// ABOUTME: Env var names live in `constants`; defaults apply when a variable is unset

pub mod constants;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_LOG_FILTER: &str = "warn";
