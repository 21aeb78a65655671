pub type StkvalResult<T> = Result<T, StkvalError>;

#[derive(Debug, thiserror::Error)]
pub enum StkvalError {
    #[error("[Config Error] {0}")]
    ConfyError(#[from] confy::ConfyError),

    #[error("[Csv Error] {0}")]
    CsvError(#[from] csv::Error),

    #[error("[Enum Error] {0}")]
    EnumError(#[from] ::strum::ParseError),

    #[error("[Http Error] {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("[Http Status Error] {0}")]
    HttpStatusError(String),

    #[error("[Invalid] {1}")]
    Invalid(&'static str, String),

    #[error("[IO Error] {0}")]
    IoError(#[from] std::io::Error),

    #[error("[Json Error] {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("[No Data] {1}")]
    NoData(&'static str, String),

    #[error("[Required] {1}")]
    Required(&'static str, String),

    #[error("[Url Error] {0}")]
    UrlError(#[from] url::ParseError),
}
