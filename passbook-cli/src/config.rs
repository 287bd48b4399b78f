use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use passbook_finance::{
    Classifier, CostHeadTable, ExpenseFilter, ExportFormat, OfxOptions, DEFAULT_EXCLUDED_PREFIX,
    DEFAULT_REPEAT_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_passbook_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub export: ExportSection,
    pub classifier: ClassifierSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Formats written by `passbook parse` when `-f` is not given
    pub formats: Vec<ExportFormat>,
    pub base_name: String,
    /// OFX `BANKID`
    pub bank_id: String,
    /// OFX `ACCTID`; "Account" when empty
    pub account_id: String,
    /// OFX `CURDEF`
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    /// Withdrawals starting with one of these are internal transfers, not expenses
    pub excluded_prefixes: Vec<String>,
    /// Customers with more credits than this are repeat customers
    pub repeat_threshold: usize,
    /// Ordered: the first matching head wins
    pub cost_heads: CostHeadTable,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            formats: ExportFormat::ALL.to_vec(),
            base_name: "statement".to_string(),
            bank_id: "HDFC0000061".to_string(),
            account_id: String::new(),
            currency: "INR".to_string(),
        }
    }
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            excluded_prefixes: vec![DEFAULT_EXCLUDED_PREFIX.to_string()],
            repeat_threshold: DEFAULT_REPEAT_THRESHOLD,
            cost_heads: CostHeadTable::default(),
        }
    }
}

impl Config {
    pub fn classifier(&self) -> Classifier {
        Classifier::new(
            self.classifier.cost_heads.clone(),
            ExpenseFilter::new(&self.classifier.excluded_prefixes),
        )
    }

    pub fn ofx_options(&self, generated_at: NaiveDateTime) -> OfxOptions {
        OfxOptions {
            bank_id: self.export.bank_id.clone(),
            account_id: self.export.account_id.clone(),
            currency: self.export.currency.clone(),
            generated_at,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_passbook_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Defaults when the file does not exist.
pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config_from(&p)?;
    let origin = if p.exists() { "" } else { " (not written yet, showing defaults)" };
    println!("# {}{origin}", p.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.classifier.repeat_threshold, 2);
        assert_eq!(cfg.export.currency, "INR");
    }

    #[test]
    fn test_defaults_survive_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        save_config_to(&Config::default(), &p).unwrap();
        assert_eq!(load_config_from(&p).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_and_custom_heads() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(
            &p,
            r#"
[export]
formats = ["csv"]
account_id = "50100012345678"

[classifier]
excluded_prefixes = []

[[classifier.cost_heads]]
name = "Rent"
keywords = ["rent"]

[[classifier.cost_heads]]
name = "Salary"
keywords = ["salary"]
"#,
        )
        .unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.export.formats, vec![ExportFormat::Csv]);
        assert_eq!(cfg.export.base_name, "statement");
        assert_eq!(cfg.classifier.repeat_threshold, 2);
        assert_eq!(cfg.classifier.cost_heads.assign("SALARY AND RENT"), "Rent");

        let generated_at = chrono::NaiveDate::from_ymd_opt(2023, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let ofx = cfg.ofx_options(generated_at);
        assert_eq!(ofx.account_id, "50100012345678");
        assert_eq!(ofx.bank_id, "HDFC0000061");
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[export\nformats = 3").unwrap();
        assert!(load_config_from(&p).is_err());
    }
}
