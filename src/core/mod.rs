pub mod etl;
pub mod pipeline;
pub mod stages;

pub use crate::domain::model::{Cell, CleanResult, CleanRules, OutputTargets, Sheet};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
