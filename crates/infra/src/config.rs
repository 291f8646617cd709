//! Configuration loading and representation.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

use quartermaster_inventory::dashboard::DEFAULT_LOW_STOCK_THRESHOLD;
use quartermaster_inventory::{QuantityPolicy, DEFAULT_ACTIVITY_CAP, DEFAULT_RECENT_LIMIT};
use quartermaster_observability::LogFormat;

const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Which repository backend to open.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    File,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "file" | "json" => Ok(Backend::File),
            other => Err(format!("unknown backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub admin_password: String,
    pub activity_log_cap: usize,
    pub recent_activity_limit: usize,
    pub quantity_policy: QuantityPolicy,
    pub low_stock_threshold: i64,
    pub log_format: LogFormat,
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            data_dir: PathBuf::from("./quartermaster-data"),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            activity_log_cap: DEFAULT_ACTIVITY_CAP,
            recent_activity_limit: DEFAULT_RECENT_LIMIT,
            quantity_policy: QuantityPolicy::AllowBelowInUse,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            log_format: LogFormat::Json,
            seed_demo_data: false,
        }
    }
}

impl Config {
    /// Read `QM_*` environment variables over the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = Config::default();

        if let Some(v) = lookup("QM_BACKEND") {
            cfg.backend = parse_var("QM_BACKEND", &v)?;
        }
        if let Some(v) = lookup("QM_DATA_DIR") {
            cfg.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("QM_ADMIN_PASSWORD").filter(|v| !v.is_empty()) {
            cfg.admin_password = v;
        }
        if let Some(v) = lookup("QM_ACTIVITY_LOG_CAP") {
            cfg.activity_log_cap = parse_var("QM_ACTIVITY_LOG_CAP", &v)?;
        }
        if let Some(v) = lookup("QM_RECENT_ACTIVITY_LIMIT") {
            cfg.recent_activity_limit = parse_var("QM_RECENT_ACTIVITY_LIMIT", &v)?;
        }
        if let Some(v) = lookup("QM_QUANTITY_POLICY") {
            cfg.quantity_policy = parse_var("QM_QUANTITY_POLICY", &v)?;
        }
        if let Some(v) = lookup("QM_LOW_STOCK_THRESHOLD") {
            cfg.low_stock_threshold = parse_var("QM_LOW_STOCK_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("QM_LOG_FORMAT") {
            cfg.log_format = parse_var("QM_LOG_FORMAT", &v)?;
        }
        if let Some(v) = lookup("QM_SEED_DEMO") {
            cfg.seed_demo_data = parse_var("QM_SEED_DEMO", &v)?;
        }

        if cfg.activity_log_cap == 0 {
            anyhow::bail!("QM_ACTIVITY_LOG_CAP must be at least 1");
        }
        Ok(cfg)
    }

    /// True when sign-in still accepts the built-in development password.
    pub fn uses_default_admin_password(&self) -> bool {
        self.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}

fn parse_var<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("invalid value for {key}: '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.activity_log_cap, 100);
        assert_eq!(cfg.recent_activity_limit, 50);
    }

    #[test]
    fn reads_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("QM_BACKEND", "file"),
            ("QM_DATA_DIR", "/tmp/qm"),
            ("QM_ADMIN_PASSWORD", "s3cret"),
            ("QM_ACTIVITY_LOG_CAP", "10"),
            ("QM_QUANTITY_POLICY", "reject_below_in_use"),
            ("QM_LOG_FORMAT", "pretty"),
            ("QM_SEED_DEMO", "true"),
        ]))
        .unwrap();
        assert_eq!(cfg.backend, Backend::File);
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/qm"));
        assert_eq!(cfg.admin_password, "s3cret");
        assert_eq!(cfg.activity_log_cap, 10);
        assert_eq!(cfg.quantity_policy, QuantityPolicy::RejectBelowInUse);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(cfg.seed_demo_data);
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let err = Config::from_lookup(lookup(&[("QM_ACTIVITY_LOG_CAP", "lots")])).unwrap_err();
        assert!(format!("{err:#}").contains("QM_ACTIVITY_LOG_CAP"));

        let err = Config::from_lookup(lookup(&[("QM_BACKEND", "postgres")])).unwrap_err();
        assert!(format!("{err:#}").contains("QM_BACKEND"));
    }

    #[test]
    fn missing_or_empty_password_falls_back_to_default() {
        assert!(Config::from_lookup(lookup(&[])).unwrap().uses_default_admin_password());
        assert!(Config::from_lookup(lookup(&[("QM_ADMIN_PASSWORD", "")]))
            .unwrap()
            .uses_default_admin_password());
        assert!(!Config::from_lookup(lookup(&[("QM_ADMIN_PASSWORD", "s3cret")]))
            .unwrap()
            .uses_default_admin_password());
    }

    #[test]
    fn zero_activity_cap_is_rejected() {
        assert!(Config::from_lookup(lookup(&[("QM_ACTIVITY_LOG_CAP", "0")])).is_err());
    }

    #[test]
    fn deserializes_with_defaults_for_missing_fields() {
        let cfg: Config = serde_json::from_str(r#"{"backend":"file","activity_log_cap":25}"#).unwrap();
        assert_eq!(cfg.backend, Backend::File);
        assert_eq!(cfg.activity_log_cap, 25);
        assert_eq!(cfg.recent_activity_limit, 50);
    }
}
