// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names read by the defect tracker

// Service Connection
pub const DEFECTS_API_URL: &str = "DEFECTS_API_URL";
pub const DEFECTS_HTTP_TIMEOUT_SECS: &str = "DEFECTS_HTTP_TIMEOUT_SECS";

// Session Storage
pub const DEFECTS_SESSION_PATH: &str = "DEFECTS_SESSION_PATH";

// Workflow
pub const DEFECTS_STRICT_TRANSITIONS: &str = "DEFECTS_STRICT_TRANSITIONS";

// List Display
pub const DEFECTS_PAGE_SIZE: &str = "DEFECTS_PAGE_SIZE";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";
