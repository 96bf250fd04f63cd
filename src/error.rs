use thiserror::Error;

#[derive(Error, Debug)]
pub enum QualityError {
    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("taxonomy error: {0}")]
    Taxonomy(String),

    #[error("weight table error: {0}")]
    Weights(String),

    #[error("rating bands error: {0}")]
    RatingBands(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("corpus error: {0}")]
    Corpus(String),

    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QualityError {
    /// Errors that mean the static inputs of a run are inconsistent.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound(_)
                | Self::ConfigParse(_)
                | Self::Taxonomy(_)
                | Self::Weights(_)
                | Self::RatingBands(_)
                | Self::Schema(_)
                | Self::Toml(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, QualityError>;
