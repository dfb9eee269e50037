use crate::adapters::{csv, xlsx};
use crate::core::stages;
use crate::core::{CleanResult, ConfigProvider, Pipeline, Sheet, Storage};
use crate::domain::model::Cell;
use crate::utils::error::{EtlError, Result};

pub struct LoopListPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> LoopListPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for LoopListPipeline<S, C> {
    async fn extract(&self) -> Result<Sheet> {
        let input_file = self.config.input_file();
        tracing::debug!("Reading workbook from: {}", input_file);

        let bytes = self.storage.read_file(input_file).await?;
        let sheet = xlsx::decode_first_worksheet(&bytes, self.config.skip_rows())?;

        tracing::debug!("Worksheet columns: {:?}", sheet.columns);
        tracing::debug!("Worksheet shape: {:?}", sheet.shape());

        Ok(sheet)
    }

    async fn transform(&self, sheet: Sheet) -> Result<CleanResult> {
        let rules = self.config.rules();

        let key_col =
            sheet
                .column_index(&rules.key_column)
                .ok_or_else(|| EtlError::MissingColumnError {
                    column: rules.key_column.clone(),
                })?;
        let guard_col = sheet.column_index(&rules.guard_column);

        let pruned = stages::prune_sparse_rows(&sheet, key_col, rules.prune_from);
        let keyed_rows = pruned
            .rows
            .iter()
            .filter(|row| !matches!(row[key_col], Cell::Empty))
            .count();
        tracing::info!(
            "📉 Pruned {} sparse rows, {} rows remain ({} with key values)",
            sheet.len() - pruned.len(),
            pruned.len(),
            keyed_rows
        );

        let merged = stages::merge_row_pairs(&pruned, key_col, guard_col, rules.merge_from)?;
        tracing::info!(
            "🔗 Merged {} rows into {}",
            pruned.len(),
            merged.len()
        );

        let id_col =
            merged
                .column_index(&rules.id_column)
                .ok_or_else(|| EtlError::MissingColumnError {
                    column: rules.id_column.clone(),
                })?;

        let mut cleaned = stages::drop_header_artifacts(&merged, id_col, &rules.header_artifact);
        let artifacts = merged.len() - cleaned.len();
        if artifacts > 0 {
            tracing::info!("🧹 Dropped {} header-artifact rows", artifacts);
        }

        if rules.dedupe {
            let before = cleaned.len();
            cleaned = stages::dedupe_by_identifier(&cleaned, id_col);
            tracing::info!("🧹 Deduplicated {} repeated identifiers", before - cleaned.len());
        }

        Ok(CleanResult { pruned, cleaned })
    }

    async fn load(&self, result: CleanResult) -> Result<String> {
        let targets = self.config.outputs().resolve_timestamps();

        let pruned_bytes = xlsx::encode_worksheet(&result.pruned)?;
        tracing::debug!("Writing pruned table to {}", targets.pruned);
        self.storage.write_file(&targets.pruned, &pruned_bytes).await?;

        // the checkpoint is the same pruned table, written out untouched
        tracing::debug!("Writing checkpoint to {}", targets.checkpoint);
        self.storage
            .write_file(&targets.checkpoint, &pruned_bytes)
            .await?;

        let cleaned_bytes = xlsx::encode_worksheet(&result.cleaned)?;
        tracing::debug!("Writing cleaned table to {}", targets.cleaned);
        self.storage
            .write_file(&targets.cleaned, &cleaned_bytes)
            .await?;

        if let Some(csv_file) = &targets.csv {
            let csv_bytes = csv::encode_sheet(&result.cleaned)?;
            tracing::debug!("Writing CSV rendition to {}", csv_file);
            self.storage.write_file(csv_file, &csv_bytes).await?;
        }

        let output_path = format!("{}/{}", self.config.output_path(), targets.cleaned);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CleanRules, OutputTargets};
    use crate::utils::error::EtlError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: Vec<u8>) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data);
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        input_file: String,
        output_path: String,
        rules: CleanRules,
        outputs: OutputTargets,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                input_file: "loop_list.xlsx".to_string(),
                output_path: "test_output".to_string(),
                rules: CleanRules::default(),
                outputs: OutputTargets::default(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_file(&self) -> &str {
            &self.input_file
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn skip_rows(&self) -> usize {
            1
        }

        fn rules(&self) -> CleanRules {
            self.rules.clone()
        }

        fn outputs(&self) -> OutputTargets {
            self.outputs.clone()
        }
    }

    fn loop_list_columns() -> Vec<String> {
        vec![
            "Loop Component".to_string(),
            "Instrument Identification".to_string(),
            "Unnamed: 2".to_string(),
        ]
    }

    fn data_sheet(rows: Vec<Vec<Cell>>) -> Sheet {
        let mut sheet = Sheet::new(loop_list_columns());
        for row in rows {
            sheet.push_row(row);
        }
        sheet
    }

    fn fixture_workbook() -> Vec<u8> {
        use rust_xlsxwriter::Workbook;

        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.write_string(0, 0, "Loop List Export").unwrap();
        ws.write_string(1, 0, "Loop Component").unwrap();
        ws.write_string(1, 1, "Instrument Identification").unwrap();
        ws.write_string(2, 0, "Loop 100").unwrap();
        ws.write_string(2, 1, "PT-100").unwrap();
        ws.write_string(3, 1, "PE-100").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[tokio::test]
    async fn test_extract_decodes_stored_workbook() {
        let storage = MockStorage::new();
        storage.put_file("loop_list.xlsx", fixture_workbook()).await;
        let pipeline = LoopListPipeline::new(storage, MockConfig::new());

        let sheet = pipeline.extract().await.unwrap();

        assert_eq!(
            sheet.columns,
            vec!["Loop Component", "Instrument Identification"]
        );
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.rows[0][1], Cell::text("PT-100"));
    }

    #[tokio::test]
    async fn test_extract_missing_file_fails() {
        let pipeline = LoopListPipeline::new(MockStorage::new(), MockConfig::new());

        assert!(pipeline.extract().await.is_err());
    }

    #[tokio::test]
    async fn test_transform_prunes_merges_and_filters() {
        // three passthrough rows, a repeated header pair, a continuation
        // pair, then sparse rows past the prune threshold
        let rows = vec![
            vec![Cell::text("Area 1"), Cell::text("PT-100"), Cell::Empty],
            vec![Cell::text("Area 1"), Cell::text("PT-101"), Cell::Empty],
            vec![Cell::text("Area 2"), Cell::text("FT-200"), Cell::Empty],
            vec![
                Cell::text("Loop A"),
                Cell::text("Instrument Identification"),
                Cell::Empty,
            ],
            vec![Cell::Empty, Cell::text("Loop Tag"), Cell::Empty],
            vec![Cell::text("Loop 300"), Cell::text("TT-300"), Cell::Empty],
            vec![Cell::Empty, Cell::text("pruned continuation"), Cell::Empty],
            vec![Cell::text("Loop 400"), Cell::text("PT-400"), Cell::text("IO-1")],
        ];
        let pipeline = LoopListPipeline::new(MockStorage::new(), MockConfig::new());

        let result = pipeline.transform(data_sheet(rows)).await.unwrap();

        // row 6 (blank key past threshold) is pruned
        assert_eq!(result.pruned.len(), 7);

        // pairs from index 3: the header pair merges into an artifact row
        // and is filtered; (Loop 300, Loop 400) refuses the merge because
        // Loop 400 carries key + guard content, and Loop 400 remains as the
        // unpaired tail
        assert_eq!(result.cleaned.len(), 5);
        assert_eq!(result.cleaned.rows[3][0], Cell::text("Loop 300"));
        assert_eq!(result.cleaned.rows[4][0], Cell::text("Loop 400"));
        // passthrough rows are untouched
        assert_eq!(result.cleaned.rows[0][1], Cell::text("PT-100"));
    }

    #[tokio::test]
    async fn test_transform_merges_continuation_rows() {
        let rows = vec![
            vec![Cell::text("Loop 1"), Cell::text("TT-1"), Cell::Empty],
            vec![Cell::text("Loop 2"), Cell::text("TE-1"), Cell::Empty],
        ];
        let mut config = MockConfig::new();
        config.rules.merge_from = 0;
        config.rules.prune_from = 0;
        let pipeline = LoopListPipeline::new(MockStorage::new(), config);

        let result = pipeline.transform(data_sheet(rows)).await.unwrap();

        assert_eq!(result.cleaned.len(), 1);
        assert_eq!(result.cleaned.rows[0][0], Cell::text("Loop 1 - Loop 2"));
        assert_eq!(result.cleaned.rows[0][1], Cell::text("TT-1 - TE-1"));
    }

    #[tokio::test]
    async fn test_transform_missing_key_column_fails() {
        let mut sheet = Sheet::new(vec!["Other".to_string()]);
        sheet.push_row(vec![Cell::text("x")]);
        let pipeline = LoopListPipeline::new(MockStorage::new(), MockConfig::new());

        let err = pipeline.transform(sheet).await.unwrap_err();

        assert!(matches!(
            err,
            EtlError::MissingColumnError { column } if column == "Loop Component"
        ));
    }

    #[tokio::test]
    async fn test_transform_empty_sheet_fails() {
        let sheet = Sheet::new(loop_list_columns());
        let pipeline = LoopListPipeline::new(MockStorage::new(), MockConfig::new());

        assert!(pipeline.transform(sheet).await.is_err());
    }

    #[tokio::test]
    async fn test_transform_dedupe_is_opt_in() {
        let rows = vec![
            vec![Cell::text("L1"), Cell::text("PT-1"), Cell::Empty],
            vec![Cell::text("L2"), Cell::text("PT-1"), Cell::Empty],
            vec![Cell::text("L3"), Cell::text("PT-2"), Cell::Empty],
        ];
        let mut config = MockConfig::new();
        config.rules.merge_from = 10; // keep rows apart so only dedupe acts
        let without = LoopListPipeline::new(MockStorage::new(), config);
        let result = without.transform(data_sheet(rows.clone())).await.unwrap();
        assert_eq!(result.cleaned.len(), 3);

        let mut config = MockConfig::new();
        config.rules.merge_from = 10;
        config.rules.dedupe = true;
        let with = LoopListPipeline::new(MockStorage::new(), config);
        let result = with.transform(data_sheet(rows)).await.unwrap();
        assert_eq!(result.cleaned.len(), 2);
    }

    #[tokio::test]
    async fn test_load_writes_all_outputs() {
        let storage = MockStorage::new();
        let pipeline = LoopListPipeline::new(storage.clone(), MockConfig::new());

        let mut pruned = Sheet::new(loop_list_columns());
        pruned.push_row(vec![Cell::text("L1"), Cell::text("PT-1"), Cell::Empty]);
        let mut cleaned = Sheet::new(loop_list_columns());
        cleaned.push_row(vec![Cell::text("L1"), Cell::text("PT-1"), Cell::Empty]);

        let output_path = pipeline
            .load(CleanResult { pruned, cleaned })
            .await
            .unwrap();

        assert_eq!(output_path, "test_output/final_output6.xlsx");

        let pruned_bytes = storage.get_file("output_clean2.xlsx").await.unwrap();
        let checkpoint_bytes = storage.get_file("check.xlsx").await.unwrap();
        assert!(storage.get_file("final_output6.xlsx").await.is_some());
        // the checkpoint is the pruned table written out untouched
        assert_eq!(pruned_bytes, checkpoint_bytes);
        // CSV rendition is opt-in and absent by default
        assert!(storage.get_file("final.csv").await.is_none());
    }

    #[tokio::test]
    async fn test_load_writes_optional_csv() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new();
        config.outputs.csv = Some("final.csv".to_string());
        let pipeline = LoopListPipeline::new(storage.clone(), config);

        let mut cleaned = Sheet::new(loop_list_columns());
        cleaned.push_row(vec![Cell::text("L1"), Cell::text("PT-1"), Cell::Empty]);
        let pruned = cleaned.clone();

        pipeline.load(CleanResult { pruned, cleaned }).await.unwrap();

        let csv_bytes = storage.get_file("final.csv").await.unwrap();
        let text = String::from_utf8(csv_bytes).unwrap();
        assert!(text.starts_with("Loop Component,Instrument Identification,Unnamed: 2"));
        assert!(text.contains("L1,PT-1,"));
    }

    #[tokio::test]
    async fn test_load_expands_timestamp_placeholder() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new();
        config.outputs.cleaned = "final_{timestamp}.xlsx".to_string();
        let pipeline = LoopListPipeline::new(storage.clone(), config);

        let mut cleaned = Sheet::new(loop_list_columns());
        cleaned.push_row(vec![Cell::text("L1"), Cell::text("PT-1"), Cell::Empty]);
        let pruned = cleaned.clone();

        let output_path = pipeline
            .load(CleanResult { pruned, cleaned })
            .await
            .unwrap();

        assert!(!output_path.contains("{timestamp}"));
        let files = storage.files.lock().await;
        assert!(files.keys().any(|k| k.starts_with("final_") && k.ends_with(".xlsx")));
    }
}
