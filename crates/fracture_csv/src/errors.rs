#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("input contains no data records")]
    EmptyInput,

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CsvError> = std::result::Result<T, E>;
