// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "influx-exporter.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "INFLUX_EXPORTER_CONFIG";

// =============================================================================
// Environment Variables - Sink
// =============================================================================

/// Environment variable for the InfluxDB base URL
pub const ENV_URL: &str = "INFLUX_EXPORTER_URL";

/// Environment variable for the target database
pub const ENV_DATABASE: &str = "INFLUX_EXPORTER_DATABASE";

/// Environment variable for the point naming policy (plain or suffixed)
pub const ENV_NAMING: &str = "INFLUX_EXPORTER_NAMING";

/// Environment variable for the HTTP write timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "INFLUX_EXPORTER_TIMEOUT_SECS";

// =============================================================================
// Defaults
// =============================================================================

/// Default InfluxDB base URL
pub const DEFAULT_URL: &str = "http://localhost:8086";

/// Default HTTP write timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Point Naming
// =============================================================================

/// Suffix for count views under suffixed naming
pub const SUFFIX_COUNT: &str = ".count";

/// Suffix for distribution views under suffixed naming
pub const SUFFIX_HISTOGRAM: &str = ".histogram";

/// Suffix for last-value and sum views under suffixed naming
pub const SUFFIX_GAUGE: &str = ".gauge";
