use crate::transaction::IsolationLevel;

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("Invalid connector configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Connector supports at most {supported} isolation, transaction requested {requested}")]
    UnsupportedIsolationLevel {
        requested: IsolationLevel,
        supported: IsolationLevel,
    },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Unknown session property: {0}")]
    UnknownSessionProperty(String),

    #[error("Invalid value for session property {name}: {value} ({reason})")]
    InvalidSessionPropertyValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    External(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = ConnectorError> = std::result::Result<T, E>;

impl From<ConnectorError> for datafusion::common::DataFusionError {
    fn from(e: ConnectorError) -> Self {
        datafusion::common::DataFusionError::External(Box::new(e))
    }
}
