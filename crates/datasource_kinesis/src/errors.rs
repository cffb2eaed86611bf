use connector_spi::errors::ConnectorError;

#[derive(Debug, thiserror::Error)]
pub enum KinesisError {
    #[error("Invalid connector configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Unsupported column type: {0}")]
    UnsupportedColumnType(String),

    #[error("{0} was not produced by this connector")]
    ForeignHandle(&'static str),

    #[error(
        "the built-in decoder cannot populate {declared} declared column(s); \
         inject a format-aware record decoder"
    )]
    DecoderUnsupported { declared: usize },

    #[error("Record decoder violated its contract: {0}")]
    Decoder(String),

    #[error("Stream client error: {0}")]
    Client(String),

    #[error("Failed to decode json: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Arrow(#[from] datafusion::arrow::error::ArrowError),
}

pub type Result<T, E = KinesisError> = std::result::Result<T, E>;

impl From<KinesisError> for ConnectorError {
    fn from(e: KinesisError) -> Self {
        match e {
            KinesisError::InvalidConfiguration(msg) => ConnectorError::InvalidConfiguration(msg),
            KinesisError::TableNotFound(name) => ConnectorError::TableNotFound(name),
            other => ConnectorError::External(Box::new(other)),
        }
    }
}

impl From<KinesisError> for datafusion::common::DataFusionError {
    fn from(e: KinesisError) -> Self {
        datafusion::common::DataFusionError::External(Box::new(e))
    }
}
