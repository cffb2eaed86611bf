//! Session properties.
//!
//! A connector advertises a fixed list of named, typed, described
//! tunables with connector-supplied defaults. The engine may override
//! any of them per session; overrides never mutate the connector's
//! defaults.

use std::collections::HashMap;
use std::fmt;

use crate::errors::{ConnectorError, Result};

/// A value for a session property. Only the types connectors actually
/// declare are representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Integer(i64),
    Varchar(String),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Varchar(_) => "varchar",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Integer(v) => write!(f, "{v}"),
            PropertyValue::Varchar(v) => write!(f, "{v}"),
        }
    }
}

/// Declaration of a single session property: name, description, default
/// value, and whether it is hidden from property listings.
///
/// Built once at connector construction; immutable afterwards. The name
/// is the property's identity and must be unique within a connector's
/// list.
#[derive(Debug, Clone)]
pub struct PropertyMetadata {
    name: &'static str,
    description: String,
    default: PropertyValue,
    hidden: bool,
}

impl PropertyMetadata {
    pub fn integer(name: &'static str, description: impl Into<String>, default: i64) -> Self {
        PropertyMetadata {
            name,
            description: description.into(),
            default: PropertyValue::Integer(default),
            hidden: false,
        }
    }

    pub fn varchar(
        name: &'static str,
        description: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        PropertyMetadata {
            name,
            description: description.into(),
            default: PropertyValue::Varchar(default.into()),
            hidden: false,
        }
    }

    /// Mark the property as hidden from listings.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default(&self) -> &PropertyValue {
        &self.default
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// Per-query session state handed to the connector by the engine.
///
/// Holds the property overrides the caller set for this session.
/// Connectors read overrides through the typed getters and fall back to
/// their own configured defaults when a property is unset.
#[derive(Debug, Clone, Default)]
pub struct ConnectorSession {
    query_id: String,
    properties: HashMap<String, PropertyValue>,
}

impl ConnectorSession {
    pub fn new(query_id: impl Into<String>) -> Self {
        ConnectorSession {
            query_id: query_id.into(),
            properties: HashMap::new(),
        }
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    /// Set a property override for this session.
    pub fn set_property(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.properties.insert(name.into(), value);
    }

    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.set_property(name, value);
        self
    }

    /// Get an integer override, `Ok(None)` when unset.
    pub fn integer_property(&self, name: &str) -> Result<Option<i64>> {
        match self.properties.get(name) {
            None => Ok(None),
            Some(PropertyValue::Integer(v)) => Ok(Some(*v)),
            Some(other) => Err(ConnectorError::InvalidSessionPropertyValue {
                name: name.to_string(),
                value: other.to_string(),
                reason: format!("expected integer, got {}", other.type_name()),
            }),
        }
    }

    /// Get a varchar override, `Ok(None)` when unset.
    pub fn varchar_property(&self, name: &str) -> Result<Option<&str>> {
        match self.properties.get(name) {
            None => Ok(None),
            Some(PropertyValue::Varchar(v)) => Ok(Some(v.as_str())),
            Some(other) => Err(ConnectorError::InvalidSessionPropertyValue {
                name: name.to_string(),
                value: other.to_string(),
                reason: format!("expected varchar, got {}", other.type_name()),
            }),
        }
    }

    /// Check every override against a connector's declared property
    /// list: unknown names and type mismatches are rejected.
    pub fn validate_against(&self, declared: &[PropertyMetadata]) -> Result<()> {
        for (name, value) in &self.properties {
            let meta = declared
                .iter()
                .find(|m| m.name() == name.as_str())
                .ok_or_else(|| ConnectorError::UnknownSessionProperty(name.clone()))?;
            if meta.default().type_name() != value.type_name() {
                return Err(ConnectorError::InvalidSessionPropertyValue {
                    name: name.clone(),
                    value: value.to_string(),
                    reason: format!(
                        "expected {}, got {}",
                        meta.default().type_name(),
                        value.type_name()
                    ),
                });
            }
        }
        Ok(())
    }
}
