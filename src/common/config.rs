//! Runtime configuration loaded from the process environment.

use std::env;

/// Output format for the tracing subscriber.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Json,
    Text,
}

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug)]
pub struct WireCfg {
    pub log_filter: String,
    pub log_format: LogFormat,
    pub max_frame_len: usize,
    pub max_depth: usize,
}

impl WireCfg {
    pub const DEFAULT_MAX_FRAME: usize = 16 * 1024 * 1024;
    pub const DEFAULT_MAX_DEPTH: usize = 32;

    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup. Unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_format = match lookup("WIRECALL_LOG_FORMAT").as_deref() {
            Some("text") => LogFormat::Text,
            _ => LogFormat::Json,
        };

        Self {
            log_filter: lookup("WIRECALL_LOG").unwrap_or_else(|| "info".to_string()),
            log_format,
            max_frame_len: lookup("WIRECALL_MAX_FRAME")
                .and_then(|v| v.parse().ok())
                .unwrap_or(Self::DEFAULT_MAX_FRAME),
            max_depth: lookup("WIRECALL_MAX_DEPTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(Self::DEFAULT_MAX_DEPTH),
        }
    }
}

impl Default for WireCfg {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = WireCfg::default();
        assert_eq!(cfg.log_filter, "info");
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.max_frame_len, WireCfg::DEFAULT_MAX_FRAME);
        assert_eq!(cfg.max_depth, WireCfg::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn overrides_are_read_and_garbage_ignored() {
        let cfg = WireCfg::from_lookup(|key| match key {
            "WIRECALL_LOG" => Some("wirecall=debug".into()),
            "WIRECALL_LOG_FORMAT" => Some("text".into()),
            "WIRECALL_MAX_FRAME" => Some("1024".into()),
            "WIRECALL_MAX_DEPTH" => Some("not-a-number".into()),
            _ => None,
        });
        assert_eq!(cfg.log_filter, "wirecall=debug");
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert_eq!(cfg.max_frame_len, 1024);
        assert_eq!(cfg.max_depth, WireCfg::DEFAULT_MAX_DEPTH);
    }
}
