use fracture_core::errors::FractureError;
use fracture_csv::errors::CsvError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to read input: {0}")]
    Ingest(#[from] CsvError),

    #[error(transparent)]
    Core(#[from] FractureError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode mapping file: {0}")]
    Mapping(#[from] serde_json::Error),

    #[error("failed to build write pool: {0}")]
    WritePool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
