//! System-wide default constants.
//!
//! Grouped by subsystem. Advisory thresholds live in
//! `types::thresholds::shaker_thresholds`.

// ============================================================================
// Configuration
// ============================================================================

/// Environment variable naming the config file to load.
pub const CONFIG_ENV_VAR: &str = "SHAKER_CONFIG";

/// Config file looked up in the current working directory.
pub const LOCAL_CONFIG_FILE: &str = "shaker_config.toml";

// ============================================================================
// Charts
// ============================================================================

/// Rows shown in the real-time shaker chart.
pub const REALTIME_WINDOW_ROWS: usize = 1_000;

// ============================================================================
// Data Table
// ============================================================================

/// Page sizes offered by the raw data table.
pub const PAGE_SIZE_OPTIONS: [usize; 3] = [50, 100, 200];

/// Initial page size of the raw data table.
pub const DEFAULT_PAGE_SIZE: usize = 100;

// ============================================================================
// Upload Cache
// ============================================================================

/// Parsed uploads retained per session, keyed by content digest.
pub const UPLOAD_CACHE_CAPACITY: usize = 4;
