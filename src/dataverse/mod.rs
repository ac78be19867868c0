use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;
use crate::error::DataverseError;

pub mod auth;
pub mod client;
pub mod connection_string;
pub mod query;

pub use client::{ServiceClient, WebApiConnector};
pub use connection_string::ConnectionString;
pub use query::{ColumnSet, ConditionExpression, ConditionOperator, FilterExpression, QueryExpression};

/// A record as the Web API returns it: a logical name plus an untyped attribute bag.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub logical_name: String,
    pub attributes: Map<String, Value>,
}

impl Entity {
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            attributes: Map::new(),
        }
    }

    pub fn with(mut self, attribute: &str, value: Value) -> Self {
        self.attributes.insert(attribute.to_string(), value);
        self
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute).filter(|v| !v.is_null())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityCollection {
    pub entities: Vec<Entity>,
}

/// An open session against one organization.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Runs `query` and returns every matching record, across all pages.
    async fn retrieve_multiple(&self, query: &QueryExpression) -> Result<EntityCollection, DataverseError>;

    /// Sets `statecode`/`statuscode` on one record. `false` means the platform refused
    /// the change or could not be reached; the reason is logged by the implementation.
    async fn update_state_and_status_for_entity(
        &self,
        entity_name: &str,
        id: Uuid,
        state_code: i32,
        status_code: i32,
    ) -> bool;

    /// Releases the session. Calls made afterwards fail.
    async fn close(&self);
}

/// Opens sessions from a connection string.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, connection_string: &str) -> Result<Box<dyn DataService>, DataverseError>;
}

/// Web API entity set name for a logical name, e.g. `solutioncomponent` -> `solutioncomponents`.
pub fn entity_set_name(logical_name: &str) -> String {
    let vowel_before_y = logical_name
        .chars()
        .rev()
        .nth(1)
        .map(|c| "aeiou".contains(c))
        .unwrap_or(false);

    if logical_name.ends_with('y') && !vowel_before_y {
        format!("{}ies", &logical_name[..logical_name.len() - 1])
    } else if ["s", "x", "ch", "sh"].iter().any(|s| logical_name.ends_with(s)) {
        format!("{}es", logical_name)
    } else {
        format!("{}s", logical_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_set_names() {
        assert_eq!(entity_set_name("solutioncomponent"), "solutioncomponents");
        assert_eq!(entity_set_name("sdkmessageprocessingstep"), "sdkmessageprocessingsteps");
        assert_eq!(entity_set_name("territory"), "territories");
        assert_eq!(entity_set_name("businessprocessflowinstance"), "businessprocessflowinstances");
        assert_eq!(entity_set_name("mailbox"), "mailboxes");
    }

    #[test]
    fn null_attributes_read_as_missing() {
        let e = Entity::new("solutioncomponent").with("objectid", Value::Null).with("componenttype", json!(92));
        assert!(e.get("objectid").is_none());
        assert_eq!(e.get("componenttype"), Some(&json!(92)));
    }
}
