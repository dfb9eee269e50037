pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::{CleanRules, OutputTargets};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "loopsheet-etl")]
#[command(about = "A small ETL tool for cleaning instrument loop-list spreadsheets")]
pub struct CliConfig {
    /// Loop-list workbook to clean
    #[arg(long, default_value = "merged_format_1.xlsx")]
    pub input_file: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Filename for the pruned table
    #[arg(long, default_value = "output_clean2.xlsx")]
    pub pruned_file: String,

    /// Filename for the unmodified pruned-table checkpoint
    #[arg(long, default_value = "check.xlsx")]
    pub checkpoint_file: String,

    /// Filename for the final merged-and-filtered table
    #[arg(long, default_value = "final_output6.xlsx")]
    pub cleaned_file: String,

    /// Also write the final table as CSV under this filename
    #[arg(long)]
    pub csv_file: Option<String>,

    #[arg(long, default_value = "Loop Component")]
    pub key_column: String,

    #[arg(long, default_value = "Instrument Identification")]
    pub id_column: String,

    #[arg(long, default_value = "Unnamed: 2")]
    pub guard_column: String,

    /// Rows whose identifier contains this text are dropped after merging
    #[arg(long, default_value = "Instrument Identification - Loop Tag")]
    pub header_artifact: String,

    /// Physical rows skipped before the header row
    #[arg(long, default_value = "1")]
    pub skip_rows: usize,

    /// First row index checked by the sparse-row pruner
    #[arg(long, default_value = "6")]
    pub prune_from: usize,

    /// First row index considered for pair merging
    #[arg(long, default_value = "3")]
    pub merge_from: usize,

    /// Drop repeated identifier rows, keeping the first
    #[arg(long)]
    pub dedupe: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Report process CPU/memory statistics")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_file(&self) -> &str {
        &self.input_file
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn skip_rows(&self) -> usize {
        self.skip_rows
    }

    fn rules(&self) -> CleanRules {
        CleanRules {
            key_column: self.key_column.clone(),
            id_column: self.id_column.clone(),
            guard_column: self.guard_column.clone(),
            header_artifact: self.header_artifact.clone(),
            prune_from: self.prune_from,
            merge_from: self.merge_from,
            dedupe: self.dedupe,
        }
    }

    fn outputs(&self) -> OutputTargets {
        OutputTargets {
            pruned: self.pruned_file.clone(),
            checkpoint: self.checkpoint_file.clone(),
            cleaned: self.cleaned_file.clone(),
            csv: self.csv_file.clone(),
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input_file", &self.input_file)?;
        validate_path("output_path", &self.output_path)?;
        validate_file_extensions("input_file", &[self.input_file.clone()], &["xlsx"])?;

        let xlsx_outputs = vec![
            self.pruned_file.clone(),
            self.checkpoint_file.clone(),
            self.cleaned_file.clone(),
        ];
        validate_file_extensions("output files", &xlsx_outputs, &["xlsx"])?;
        if let Some(csv_file) = &self.csv_file {
            validate_file_extensions("csv_file", &[csv_file.clone()], &["csv"])?;
        }

        validate_non_empty_string("key_column", &self.key_column)?;
        validate_non_empty_string("id_column", &self.id_column)?;
        validate_non_empty_string("guard_column", &self.guard_column)?;
        validate_non_empty_string("header_artifact", &self.header_artifact)?;

        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig {
            input_file: "loop_list.xlsx".to_string(),
            output_path: "./output".to_string(),
            pruned_file: "pruned.xlsx".to_string(),
            checkpoint_file: "check.xlsx".to_string(),
            cleaned_file: "final.xlsx".to_string(),
            csv_file: None,
            key_column: "Loop Component".to_string(),
            id_column: "Instrument Identification".to_string(),
            guard_column: "Unnamed: 2".to_string(),
            header_artifact: "Instrument Identification - Loop Tag".to_string(),
            skip_rows: 1,
            prune_from: 6,
            merge_from: 3,
            dedupe: false,
            verbose: false,
            monitor: false,
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_xlsx_output() {
        let mut config = base_config();
        config.cleaned_file = "final.txt".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_key_column() {
        let mut config = base_config();
        config.key_column = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_csv_with_wrong_extension() {
        let mut config = base_config();
        config.csv_file = Some("final.xlsx".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rules_mirror_flags() {
        let mut config = base_config();
        config.dedupe = true;
        config.merge_from = 4;

        let rules = config.rules();

        assert_eq!(rules.key_column, "Loop Component");
        assert_eq!(rules.merge_from, 4);
        assert!(rules.dedupe);
    }
}
