//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::{IpAddr, Ipv4Addr};

// =============================================================================
// Command Defaults
// =============================================================================

pub fn default_prefix() -> String {
    "/".to_string()
}

pub fn default_separators() -> Vec<String> {
    vec![" ".to_string()]
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_filter() -> String {
    "info".to_string()
}

// =============================================================================
// Metrics Defaults
// =============================================================================

pub fn default_metrics_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}
