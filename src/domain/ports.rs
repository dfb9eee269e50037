use crate::domain::model::{CleanResult, CleanRules, OutputTargets, Sheet};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn skip_rows(&self) -> usize;
    fn rules(&self) -> CleanRules;
    fn outputs(&self) -> OutputTargets;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Sheet>;
    async fn transform(&self, sheet: Sheet) -> Result<CleanResult>;
    async fn load(&self, result: CleanResult) -> Result<String>;
}
