use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Workbook read error: {0}")]
    XlsxReadError(#[from] calamine::XlsxError),

    #[error("Workbook write error: {0}")]
    XlsxWriteError(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Worksheet is missing required column '{column}'")]
    MissingColumnError { column: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for '{field}' ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Output,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::XlsxReadError(_) => ErrorCategory::Input,
            EtlError::XlsxWriteError(_) | EtlError::CsvError(_) => ErrorCategory::Output,
            EtlError::IoError(_) => ErrorCategory::System,
            EtlError::ConfigValidationError { .. } | EtlError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            EtlError::MissingColumnError { .. } | EtlError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::System => ErrorSeverity::Critical,
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::XlsxReadError(_) => {
                "Check that the input file is a valid .xlsx workbook".to_string()
            }
            EtlError::XlsxWriteError(_) | EtlError::CsvError(_) => {
                "Check that the output directory is writable and has free space".to_string()
            }
            EtlError::IoError(_) => {
                "Check file paths and filesystem permissions".to_string()
            }
            EtlError::MissingColumnError { column } => format!(
                "Verify the header row contains a '{}' column, or adjust the column flags",
                column
            ),
            EtlError::ConfigValidationError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Review the command-line flags or job file and try again".to_string()
            }
            EtlError::ProcessingError { .. } => {
                "Check that the input worksheet has the expected layout and data rows".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::XlsxReadError(e) => format!("Could not read the workbook: {}", e),
            EtlError::XlsxWriteError(e) => format!("Could not write the workbook: {}", e),
            EtlError::CsvError(e) => format!("Could not write the CSV output: {}", e),
            EtlError::IoError(e) => format!("File system error: {}", e),
            EtlError::MissingColumnError { column } => {
                format!("The worksheet has no '{}' column", column)
            }
            EtlError::ProcessingError { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
