//! Table metadata resolution.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use connector_spi::errors::Result as SpiResult;
use connector_spi::metadata::{
    ConnectorMetadata, ConnectorTableHandle, ConnectorTableMetadata, SchemaTableName,
};
use tracing::{debug, info};

use crate::config::KinesisConnectorConfig;
use crate::errors::{KinesisError, Result};
use crate::table::{table_schema, KinesisTableDescription, KinesisTableHandle};

/// Resolves table/schema identity from the JSON descriptions in the
/// configured directory, and owns the static connector configuration.
///
/// Descriptions are read once at construction; the resolver is
/// immutable afterwards.
pub struct KinesisMetadata {
    config: KinesisConnectorConfig,
    tables: HashMap<SchemaTableName, KinesisTableDescription>,
}

impl KinesisMetadata {
    /// Load every `*.json` description under the configured directory.
    /// Fails fast on an unreadable directory, invalid JSON, or a
    /// duplicate table name.
    pub fn load(config: KinesisConnectorConfig) -> Result<Self> {
        let dir = &config.table_description_dir;
        let entries = std::fs::read_dir(dir).map_err(|e| {
            KinesisError::InvalidConfiguration(format!(
                "unable to read table description dir {}: {e}",
                dir.display()
            ))
        })?;

        let mut tables = HashMap::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let file = std::fs::File::open(&path)?;
            let desc: KinesisTableDescription =
                serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| {
                    KinesisError::InvalidConfiguration(format!(
                        "invalid table description {}: {e}",
                        path.display()
                    ))
                })?;

            let name = SchemaTableName::new(
                desc.schema_name
                    .clone()
                    .unwrap_or_else(|| config.default_schema.clone()),
                desc.table_name.clone(),
            );
            debug!(table = %name, stream = %desc.stream_name, "loaded table description");

            if tables.insert(name.clone(), desc).is_some() {
                return Err(KinesisError::InvalidConfiguration(format!(
                    "duplicate table description for {name}"
                )));
            }
        }

        info!(
            tables = tables.len(),
            dir = %dir.display(),
            "loaded Kinesis table descriptions"
        );
        Ok(KinesisMetadata { config, tables })
    }

    /// The static configuration this connector was constructed with.
    pub fn connector_config(&self) -> &KinesisConnectorConfig {
        &self.config
    }

    pub fn description(&self, name: &SchemaTableName) -> Option<&KinesisTableDescription> {
        self.tables.get(name)
    }
}

#[async_trait]
impl ConnectorMetadata for KinesisMetadata {
    async fn list_schema_names(&self) -> SpiResult<Vec<String>> {
        let mut schemas: Vec<String> = self.tables.keys().map(|n| n.schema.clone()).collect();
        schemas.sort_unstable();
        schemas.dedup();
        Ok(schemas)
    }

    async fn list_tables(&self, schema: Option<&str>) -> SpiResult<Vec<SchemaTableName>> {
        let mut names: Vec<SchemaTableName> = self
            .tables
            .keys()
            .filter(|n| schema.map_or(true, |s| n.schema == s))
            .cloned()
            .collect();
        names.sort_by(|a, b| (&a.schema, &a.table).cmp(&(&b.schema, &b.table)));
        Ok(names)
    }

    async fn table_handle(
        &self,
        name: &SchemaTableName,
    ) -> SpiResult<Option<Arc<dyn ConnectorTableHandle>>> {
        Ok(self.tables.get(name).map(|desc| {
            Arc::new(KinesisTableHandle {
                schema_name: name.schema.clone(),
                table_name: name.table.clone(),
                stream_name: desc.stream_name.clone(),
            }) as Arc<dyn ConnectorTableHandle>
        }))
    }

    async fn table_metadata(
        &self,
        handle: &dyn ConnectorTableHandle,
    ) -> SpiResult<ConnectorTableMetadata> {
        let handle = handle
            .as_any()
            .downcast_ref::<KinesisTableHandle>()
            .ok_or(KinesisError::ForeignHandle("table handle"))?;

        let name = SchemaTableName::new(handle.schema_name.clone(), handle.table_name.clone());
        let desc = self
            .tables
            .get(&name)
            .ok_or_else(|| KinesisError::TableNotFound(name.to_string()))?;

        let schema = table_schema(&desc.columns, self.config.hide_internal_columns)?;
        Ok(ConnectorTableMetadata { name, schema })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::table::internal_fields;

    fn write_description(dir: &std::path::Path, file: &str, json: &str) {
        let mut f = std::fs::File::create(dir.join(file)).unwrap();
        f.write_all(json.as_bytes()).unwrap();
    }

    fn test_metadata(hide_internal_columns: bool) -> KinesisMetadata {
        let dir = tempfile::tempdir().unwrap();
        write_description(
            dir.path(),
            "orders.json",
            r#"{
                "table_name": "orders",
                "schema_name": "prod",
                "stream_name": "orders-stream",
                "columns": [{"name": "order_id", "type": "bigint"}]
            }"#,
        );
        write_description(
            dir.path(),
            "raw.json",
            r#"{"table_name": "raw", "stream_name": "raw-stream"}"#,
        );
        // Non-JSON files are ignored.
        write_description(dir.path(), "README.txt", "not a table");

        let mut config = KinesisConnectorConfig::new(dir.path());
        config.hide_internal_columns = hide_internal_columns;
        // Keep the tempdir alive for the duration of the load.
        let metadata = KinesisMetadata::load(config).unwrap();
        drop(dir);
        metadata
    }

    #[tokio::test]
    async fn lists_schemas_and_tables() {
        let metadata = test_metadata(true);

        assert_eq!(
            metadata.list_schema_names().await.unwrap(),
            vec!["default".to_string(), "prod".to_string()]
        );
        assert_eq!(
            metadata.list_tables(None).await.unwrap(),
            vec![
                SchemaTableName::new("default", "raw"),
                SchemaTableName::new("prod", "orders"),
            ]
        );
        assert_eq!(
            metadata.list_tables(Some("prod")).await.unwrap(),
            vec![SchemaTableName::new("prod", "orders")]
        );
    }

    #[tokio::test]
    async fn resolves_handles_and_metadata() {
        let metadata = test_metadata(false);

        let name = SchemaTableName::new("prod", "orders");
        let handle = metadata.table_handle(&name).await.unwrap().unwrap();
        let resolved = metadata.table_metadata(handle.as_ref()).await.unwrap();
        assert_eq!(resolved.name, name);
        assert_eq!(resolved.schema.fields().len(), 1 + internal_fields().len());

        let missing = SchemaTableName::new("prod", "nope");
        assert!(metadata.table_handle(&missing).await.unwrap().is_none());
    }

    #[test]
    fn missing_dir_fails_fast() {
        let config = KinesisConnectorConfig::new("/nonexistent/kinesis-tables");
        assert!(matches!(
            KinesisMetadata::load(config),
            Err(KinesisError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn invalid_json_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        write_description(dir.path(), "bad.json", "{not json");
        let config = KinesisConnectorConfig::new(dir.path());
        assert!(matches!(
            KinesisMetadata::load(config),
            Err(KinesisError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn duplicate_table_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let desc = r#"{"table_name": "raw", "stream_name": "raw-stream"}"#;
        write_description(dir.path(), "a.json", desc);
        write_description(dir.path(), "b.json", desc);
        let config = KinesisConnectorConfig::new(dir.path());
        assert!(matches!(
            KinesisMetadata::load(config),
            Err(KinesisError::InvalidConfiguration(_))
        ));
    }
}
