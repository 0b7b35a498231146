use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::courses::CourseSortMode;
use crate::extract::{SortKey, DEFAULT_EMPTY_TOKEN};
use crate::model::normalize;
use crate::ranking::DEFAULT_STATUS_VOCABULARY;
use crate::sorting::{SortDirection, SortState};

pub const CONFIG_ENV: &str = "EXAMSORTD_CONFIG";

/// Statuses at the head of the vocabulary that still accept a grade
/// when `editable_statuses` is not set.
const LEADING_EDITABLE_STATUSES: usize = 2;

pub const DEFAULT_MAX_OPEN_TABLES: usize = 256;

fn leading_statuses<S: AsRef<str>>(vocabulary: &[S]) -> Vec<String> {
    vocabulary
        .iter()
        .map(|s| normalize(s.as_ref()))
        .filter(|s| !s.is_empty())
        .take(LEADING_EDITABLE_STATUSES)
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    default_sort_key: String,
    default_sort_dir: String,
    empty_result_token: String,
    status_vocabulary: Vec<String>,
    editable_statuses: Option<Vec<String>>,
    course_sort_default: String,
    max_open_tables: usize,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            default_sort_key: SortKey::StudentNumber.as_str().to_string(),
            default_sort_dir: SortDirection::Ascending.as_str().to_string(),
            empty_result_token: DEFAULT_EMPTY_TOKEN.to_string(),
            status_vocabulary: DEFAULT_STATUS_VOCABULARY.iter().map(|s| s.to_string()).collect(),
            editable_statuses: None,
            course_sort_default: CourseSortMode::default().as_str().to_string(),
            max_open_tables: DEFAULT_MAX_OPEN_TABLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub default_sort: SortState,
    pub empty_result_token: String,
    pub status_vocabulary: Vec<String>,
    /// Normalized statuses whose grade can still be changed.
    pub editable_statuses: Vec<String>,
    pub course_sort_default: CourseSortMode,
    /// Open tables kept before the least recently used one is dropped.
    pub max_open_tables: NonZeroUsize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_sort: SortState::default(),
            empty_result_token: DEFAULT_EMPTY_TOKEN.to_string(),
            status_vocabulary: DEFAULT_STATUS_VOCABULARY.iter().map(|s| s.to_string()).collect(),
            editable_statuses: leading_statuses(&DEFAULT_STATUS_VOCABULARY[..]),
            course_sort_default: CourseSortMode::default(),
            max_open_tables: NonZeroUsize::new(DEFAULT_MAX_OPEN_TABLES).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let raw: RawConfig = toml::from_str(text).context("parse config toml")?;
        let key: SortKey = raw.default_sort_key.parse()?;
        let direction: SortDirection = raw.default_sort_dir.parse()?;
        let course_sort_default: CourseSortMode = raw.course_sort_default.parse()?;
        if raw.status_vocabulary.iter().all(|s| s.trim().is_empty()) {
            anyhow::bail!("status_vocabulary must name at least one status");
        }
        let editable_statuses = match raw.editable_statuses {
            Some(list) => {
                let known: Vec<String> = raw.status_vocabulary.iter().map(|s| normalize(s)).collect();
                let list: Vec<String> = list.iter().map(|s| normalize(s)).collect();
                if let Some(unknown) = list.iter().find(|s| !known.contains(s)) {
                    anyhow::bail!("editable status {unknown:?} is not in status_vocabulary");
                }
                list
            }
            None => leading_statuses(raw.status_vocabulary.as_slice()),
        };
        let max_open_tables = NonZeroUsize::new(raw.max_open_tables)
            .context("max_open_tables must be at least 1")?;
        Ok(Self {
            default_sort: SortState { key, direction },
            empty_result_token: raw.empty_result_token,
            status_vocabulary: raw.status_vocabulary,
            editable_statuses,
            course_sort_default,
            max_open_tables,
        })
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("load config {}", path.display()))
    }

    /// Config file named by `EXAMSORTD_CONFIG`, or defaults when unset.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(p) if !p.is_empty() => {
                let cfg = Self::from_path(Path::new(&p))?;
                tracing::info!(path = %Path::new(&p).display(), "loaded config");
                Ok(cfg)
            }
            _ => {
                tracing::debug!("no {CONFIG_ENV} set, using defaults");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = Config::from_toml_str("").expect("parse");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = Config::from_toml_str(
            r#"
default_sort_key = "student.surname"
default_sort_dir = "desc"
empty_result_token = "<empty>"
status_vocabulary = ["draft", "final"]
course_sort_default = "cfuAsc"
"#,
        )
        .expect("parse");
        assert_eq!(cfg.default_sort.key, SortKey::StudentSurname);
        assert_eq!(cfg.default_sort.direction, SortDirection::Descending);
        assert_eq!(cfg.empty_result_token, "<empty>");
        assert_eq!(cfg.status_vocabulary, vec!["draft", "final"]);
        assert_eq!(cfg.course_sort_default, CourseSortMode::CfuAsc);
        assert_eq!(cfg.editable_statuses, vec!["draft", "final"]);
    }

    #[test]
    fn editable_statuses_follow_the_vocabulary() {
        assert_eq!(Config::default().editable_statuses, vec!["not entered", "entered"]);

        let cfg = Config::from_toml_str(
            r#"status_vocabulary = ["Non inserito", "inserito", "pubblicato", "rifiutato", "verbalizzato"]"#,
        )
        .expect("parse");
        assert_eq!(cfg.editable_statuses, vec!["non inserito", "inserito"]);
        let reg = crate::model::Registration {
            status: Some("Inserito".to_string()),
            ..Default::default()
        };
        assert!(reg.is_editable(cfg.editable_statuses.as_slice()));

        let cfg = Config::from_toml_str(
            r#"
status_vocabulary = ["non inserito", "inserito", "pubblicato"]
editable_statuses = ["Non Inserito"]
"#,
        )
        .expect("parse");
        assert_eq!(cfg.editable_statuses, vec!["non inserito"]);
        assert!(!reg.is_editable(cfg.editable_statuses.as_slice()));
    }

    #[test]
    fn open_table_cap() {
        assert_eq!(Config::default().max_open_tables.get(), DEFAULT_MAX_OPEN_TABLES);
        let cfg = Config::from_toml_str("max_open_tables = 3").expect("parse");
        assert_eq!(cfg.max_open_tables.get(), 3);
        assert!(Config::from_toml_str("max_open_tables = 0").is_err());
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Config::from_toml_str(r#"default_sort_key = "student.age""#).is_err());
        assert!(Config::from_toml_str(r#"default_sort_dir = "up""#).is_err());
        assert!(Config::from_toml_str(r#"status_vocabulary = []"#).is_err());
        assert!(Config::from_toml_str(r#"colour = "blue""#).is_err());
        assert!(Config::from_toml_str(r#"editable_statuses = ["draft"]"#).is_err());
    }
}
