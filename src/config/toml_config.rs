use crate::core::ConfigProvider;
use crate::domain::model::{CleanRules, OutputTargets};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cleaning job described as a TOML file, for scripted/scheduled runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    pub source: SourceConfig,
    pub columns: Option<ColumnConfig>,
    pub transform: Option<TransformConfig>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_file: String,
    pub skip_rows: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub key: Option<String>,
    pub id: Option<String>,
    pub guard: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    pub prune_from: Option<usize>,
    pub merge_from: Option<usize>,
    pub header_artifact: Option<String>,
    pub dedupe: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub pruned_file: Option<String>,
    pub checkpoint_file: Option<String>,
    pub cleaned_file: Option<String>,
    pub csv_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR_NAME}` occurrences with environment values; unknown
    /// variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("source.input_file", &self.source.input_file)?;
        validate_file_extensions(
            "source.input_file",
            &[self.source.input_file.clone()],
            &["xlsx"],
        )?;
        validate_path("load.output_path", &self.load.output_path)?;

        let outputs = self.outputs();
        let xlsx_outputs = vec![outputs.pruned, outputs.checkpoint, outputs.cleaned];
        validate_file_extensions("load output files", &xlsx_outputs, &["xlsx"])?;
        if let Some(csv_file) = &outputs.csv {
            validate_file_extensions("load.csv_file", &[csv_file.clone()], &["csv"])?;
        }

        let rules = self.rules();
        validate_non_empty_string("columns.key", &rules.key_column)?;
        validate_non_empty_string("columns.id", &rules.id_column)?;
        validate_non_empty_string("columns.guard", &rules.guard_column)?;
        validate_non_empty_string("transform.header_artifact", &rules.header_artifact)?;

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_file(&self) -> &str {
        &self.source.input_file
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn skip_rows(&self) -> usize {
        self.source.skip_rows.unwrap_or(1)
    }

    fn rules(&self) -> CleanRules {
        let defaults = CleanRules::default();
        let columns = self.columns.clone().unwrap_or_default();
        let transform = self.transform.clone().unwrap_or_default();

        CleanRules {
            key_column: columns.key.unwrap_or(defaults.key_column),
            id_column: columns.id.unwrap_or(defaults.id_column),
            guard_column: columns.guard.unwrap_or(defaults.guard_column),
            header_artifact: transform.header_artifact.unwrap_or(defaults.header_artifact),
            prune_from: transform.prune_from.unwrap_or(defaults.prune_from),
            merge_from: transform.merge_from.unwrap_or(defaults.merge_from),
            dedupe: transform.dedupe.unwrap_or(defaults.dedupe),
        }
    }

    fn outputs(&self) -> OutputTargets {
        let defaults = OutputTargets::default();
        OutputTargets {
            pruned: self.load.pruned_file.clone().unwrap_or(defaults.pruned),
            checkpoint: self
                .load
                .checkpoint_file
                .clone()
                .unwrap_or(defaults.checkpoint),
            cleaned: self.load.cleaned_file.clone().unwrap_or(defaults.cleaned),
            csv: self.load.csv_file.clone(),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
