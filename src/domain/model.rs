use serde::{Deserialize, Serialize};

/// A single worksheet cell. `Empty` is the explicit absent marker and is
/// distinct from `Text("")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text<S: Into<String>>(value: S) -> Self {
        Cell::Text(value.into())
    }

    /// Blank in the pruner/guard sense: absent, the exact empty string, or a
    /// NaN number. Whitespace-only text is NOT blank here.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(n) => n.is_nan(),
        }
    }

    /// Normalized string form used when coalescing row pairs: trimmed, with
    /// the literal text "nan" (any casing) collapsed to empty.
    pub fn merge_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.eq_ignore_ascii_case("nan") {
                    String::new()
                } else {
                    trimmed.to_string()
                }
            }
            Cell::Number(n) if n.is_nan() => String::new(),
            Cell::Number(n) => format!("{}", n),
        }
    }
}

/// In-memory table: ordered column names plus rows of cells. Every row is
/// kept as wide as the column list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (rows, columns), like a dataframe shape.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, padding or truncating it to the column width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }
}

/// Cleaning rules for one loop-list layout: which columns drive the stages
/// and where pruning/merging start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRules {
    pub key_column: String,
    pub id_column: String,
    pub guard_column: String,
    pub header_artifact: String,
    pub prune_from: usize,
    pub merge_from: usize,
    pub dedupe: bool,
}

impl Default for CleanRules {
    fn default() -> Self {
        Self {
            key_column: "Loop Component".to_string(),
            id_column: "Instrument Identification".to_string(),
            guard_column: "Unnamed: 2".to_string(),
            header_artifact: "Instrument Identification - Loop Tag".to_string(),
            prune_from: 6,
            merge_from: 3,
            dedupe: false,
        }
    }
}

/// Output filenames, relative to the configured output directory. Defaults
/// preserve the names the original cleaning run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputTargets {
    pub pruned: String,
    pub checkpoint: String,
    pub cleaned: String,
    pub csv: Option<String>,
}

impl Default for OutputTargets {
    fn default() -> Self {
        Self {
            pruned: "output_clean2.xlsx".to_string(),
            checkpoint: "check.xlsx".to_string(),
            cleaned: "final_output6.xlsx".to_string(),
            csv: None,
        }
    }
}

impl OutputTargets {
    /// Expand `{timestamp}` placeholders in every filename with the current
    /// UTC time.
    pub fn resolve_timestamps(&self) -> OutputTargets {
        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let expand = |name: &str| name.replace("{timestamp}", &stamp);
        OutputTargets {
            pruned: expand(&self.pruned),
            checkpoint: expand(&self.checkpoint),
            cleaned: expand(&self.cleaned),
            csv: self.csv.as_deref().map(expand),
        }
    }
}

/// What the transform phase hands to the load phase: the pruned sheet (also
/// written out as an unmodified checkpoint) and the final cleaned sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanResult {
    pub pruned: Sheet,
    pub cleaned: Sheet,
}
