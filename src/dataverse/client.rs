use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;
use crate::dataverse::{auth, entity_set_name, Connector, ConnectionString, DataService, Entity, EntityCollection, QueryExpression};
use crate::dataverse::query::lookup_value_name;
use crate::error::DataverseError;

const API_PATH: &str = "/api/data/v9.2";
const CONNECT_TIMEOUT: u64 = 5;
const PAGE_SIZE: u32 = 5000;

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    value: Vec<Map<String, Value>>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

/// Session against the Dataverse Web API, authenticated with a client secret.
pub struct ServiceClient {
    http: Client,
    api_base: String,
    // None once the session is closed.
    token: Mutex<Option<String>>,
}

impl ServiceClient {
    pub async fn connect(connection_string: &str, timeout: Duration) -> Result<Self, DataverseError> {
        let conn = ConnectionString::parse(connection_string)?;

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT))
            .timeout(timeout)
            .build()?;

        let api_base = format!("{}{}", conn.url, API_PATH);

        let authority = match conn.authority {
            Some(a) => a,
            None => auth::discover_authority(&http, &api_base).await?,
        };
        tracing::debug!(%authority, "Requesting access token");

        let token = auth::acquire_token(&http, &authority, &conn.client_id, &conn.client_secret, &conn.url).await?;

        Ok(Self {
            http,
            api_base,
            token: Mutex::new(Some(token)),
        })
    }

    fn bearer(&self) -> Result<String, DataverseError> {
        let guard = self.token.lock().map_err(|_| DataverseError::SessionClosed)?;
        guard.clone().ok_or(DataverseError::SessionClosed)
    }

    fn request(&self, req: RequestBuilder) -> Result<RequestBuilder, DataverseError> {
        Ok(req
            .bearer_auth(self.bearer()?)
            .header(header::ACCEPT, "application/json")
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0"))
    }

    async fn update_state(&self, entity_name: &str, id: Uuid, state_code: i32, status_code: i32) -> Result<(), DataverseError> {
        let url = format!("{}/{}({})", self.api_base, entity_set_name(entity_name), id);
        let resp = self
            .request(self.http.patch(&url))?
            .header("If-Match", "*")
            .json(&json!({ "statecode": state_code, "statuscode": status_code }))
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(DataverseError::Status {
                operation: "update",
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl DataService for ServiceClient {
    async fn retrieve_multiple(&self, query: &QueryExpression) -> Result<EntityCollection, DataverseError> {
        let first = format!("{}/{}", self.api_base, entity_set_name(&query.entity_name));
        let mut req = self.http.get(&first).query(&query.to_odata_params());
        let mut entities = Vec::new();
        let mut seen_links = HashSet::new();

        loop {
            let resp = self
                .request(req)?
                .header("Prefer", format!("odata.maxpagesize={}", PAGE_SIZE))
                .send()
                .await?;

            if !resp.status().is_success() {
                return Err(DataverseError::Status {
                    operation: "retrieve",
                    status: resp.status().as_u16(),
                    body: resp.text().await.unwrap_or_default(),
                });
            }

            let page: Page = resp
                .json()
                .await
                .map_err(|e| DataverseError::Response(format!("malformed entity page: {}", e)))?;

            entities.extend(page.value.into_iter().map(|row| to_entity(&query.entity_name, &query.column_set.lookups, row)));

            match page.next_link {
                Some(next) => {
                    if !seen_links.insert(next.clone()) {
                        return Err(DataverseError::Response(format!("paging returned {} twice", next)));
                    }
                    req = self.http.get(&next);
                }
                None => break,
            }
        }

        Ok(EntityCollection { entities })
    }

    async fn update_state_and_status_for_entity(&self, entity_name: &str, id: Uuid, state_code: i32, status_code: i32) -> bool {
        match self.update_state(entity_name, id, state_code, status_code).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(entity = entity_name, %id, error = %e, "State update rejected");
                false
            }
        }
    }

    async fn close(&self) {
        if let Ok(mut guard) = self.token.lock() {
            guard.take();
        }
        tracing::debug!("Session closed");
    }
}

// Drops OData annotations and gives lookups back their plain attribute name.
fn to_entity(logical_name: &str, lookups: &[String], row: Map<String, Value>) -> Entity {
    let mut entity = Entity::new(logical_name);
    for (key, value) in row {
        if key.contains('@') {
            continue;
        }
        let name = lookups
            .iter()
            .find(|l| lookup_value_name(l) == key)
            .cloned()
            .unwrap_or(key);
        entity.attributes.insert(name, value);
    }
    entity
}

/// Opens [`ServiceClient`] sessions.
pub struct WebApiConnector {
    pub timeout: Duration,
}

impl Default for WebApiConnector {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(60) }
    }
}

#[async_trait]
impl Connector for WebApiConnector {
    async fn connect(&self, connection_string: &str) -> Result<Box<dyn DataService>, DataverseError> {
        let client = ServiceClient::connect(connection_string, self.timeout).await?;
        Ok(Box::new(client))
    }
}
