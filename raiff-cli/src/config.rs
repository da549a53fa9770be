use anyhow::{bail, Context, Result};
use raiff_core::{RuleSet, RuleSpec};
use raiff_ingest::ExtractConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// `~/.raiff/config.toml`. Every section is optional; missing keys take the
/// Raiffeisen defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    pub rules: Vec<RuleSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extract: ExtractConfig::default(),
            rules: RuleSet::raiffeisen_specs(),
        }
    }
}

impl Config {
    pub fn rule_set(&self) -> Result<RuleSet> {
        RuleSet::compile(&self.rules).context("invalid classification rules in config")
    }
}

pub fn raiff_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".raiff"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(raiff_home()?.join("config.toml"))
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

/// Load an explicitly given config (which must exist) or the default one
/// (which may be absent).
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = match explicit {
        Some(p) => {
            if !p.exists() {
                bail!("config not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => {
            let p = config_path()?;
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let cfg = parse_config(&s).with_context(|| format!("in {}", p.display()))?;
    tracing::debug!(path = %p.display(), "loaded config");
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use raiff_core::{Category, Currency};
    use raiff_ingest::{Area, PageRole};

    #[test]
    fn test_empty_config_is_default() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.extract, ExtractConfig::default());
        assert_eq!(cfg.rules, RuleSet::raiffeisen_specs());
    }

    #[test]
    fn test_partial_config() {
        let cfg = parse_config(
            r#"
[extract]
crop_last_page = true
workers = 2

[extract.tabula]
jar = "/opt/tabula/tabula-1.0.5-jar-with-dependencies.jar"

[[extract.layout]]
currency = "RSD"
role = "last"
area = { top = 60.0, left = 11.0, bottom = 700.0, right = 596.0 }

[[rules]]
category = "salary"
matcher = { regex = "^(ZARADA|PLATA)" }
"#,
        )
        .unwrap();
        assert!(cfg.extract.crop_last_page);
        assert_eq!(cfg.extract.workers, Some(2));
        assert_eq!(cfg.extract.currency_label, "Strana:");
        assert_eq!(cfg.extract.tabula.java, "java");
        assert_eq!(
            cfg.extract.layout.area(Currency::Rsd, PageRole::Last),
            Some(Area::new(60.0, 11.0, 700.0, 596.0))
        );
        let rules = cfg.rule_set().unwrap();
        assert_eq!(rules.classify("PLATA 03"), Some(Category::Salary));
        // rules replace the defaults wholesale
        assert_eq!(rules.classify("Prevoz"), None);
    }

    #[test]
    fn test_bad_regex_rule_is_reported() {
        let cfg = parse_config(
            r#"
[[rules]]
category = "salary"
matcher = { regex = "(" }
"#,
        )
        .unwrap();
        assert!(cfg.rule_set().is_err());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        assert!(load_config(Some(Path::new("/nonexistent/raiff.toml"))).is_err());
    }

    #[test]
    fn test_load_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("raiff.toml");
        fs::write(&p, "[extract]\npayout_marker = \"Payout\"\n").unwrap();
        let cfg = load_config(Some(&p)).unwrap();
        assert_eq!(cfg.extract.payout_marker, "Payout");
    }
}
