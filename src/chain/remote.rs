use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{ChainClient, ChainError, Operation, WalletInfo};

const DEFAULT_CHAIN_QUERY: &str = "query { chains { default } }";

/// Relays operations and queries to a node service over GraphQL.
///
/// Nothing here retries, caches or times out beyond the HTTP client's own
/// defaults; a failed request is returned to the caller as-is.
#[derive(Debug)]
pub struct RemoteChain {
    http: Client,
    node_url: String,
    graphql_endpoint: String,
    chain_id: Option<String>,
    owner: Option<String>,
    wallet: Option<WalletInfo>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl RemoteChain {
    pub fn new(
        node_url: &str,
        graphql_endpoint: &str,
        chain_id: Option<String>,
        owner: Option<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            node_url: node_url.trim_end_matches('/').to_string(),
            graphql_endpoint: graphql_endpoint.to_string(),
            chain_id,
            owner,
            wallet: None,
        }
    }

    /// Endpoint of one application on one chain
    pub fn application_url(&self, chain_id: &str, app_id: &str) -> String {
        format!("{}/chains/{chain_id}/applications/{app_id}", self.node_url)
    }

    fn post(&self, url: &str, query: &str) -> Result<Value, ChainError> {
        debug!(url, query, "posting graphql request");
        let response = self
            .http
            .post(url)
            .json(&json!({ "query": query }))
            .send()?
            .error_for_status()?;
        let body: Value = response.json()?;
        parse_response(body)
    }

    fn app_url(&self, app_id: &str) -> Result<String, ChainError> {
        let wallet = self.wallet.as_ref().ok_or(ChainError::NotConnected)?;
        if app_id.is_empty() {
            return Err(ChainError::MissingApplication);
        }
        Ok(self.application_url(&wallet.chain_id, app_id))
    }
}

/// Unwrap a GraphQL envelope: `errors` wins over `data`
pub fn parse_response(body: Value) -> Result<Value, ChainError> {
    let response: GraphQlResponse =
        serde_json::from_value(body).map_err(|e| ChainError::Response(e.to_string()))?;
    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(ChainError::GraphQl(messages.join("; ")));
    }
    Ok(response.data.unwrap_or(Value::Null))
}

impl ChainClient for RemoteChain {
    fn connect(&mut self) -> Result<WalletInfo, ChainError> {
        let chain_id = match &self.chain_id {
            Some(id) => id.clone(),
            None => {
                let data = self.post(&self.graphql_endpoint, DEFAULT_CHAIN_QUERY)?;
                data.pointer("/chains/default")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| ChainError::Response("node reported no default chain".into()))?
            }
        };
        let owner = self.owner.clone().unwrap_or_else(|| chain_id.clone());

        info!(%chain_id, node = %self.node_url, "connected to node");
        let wallet = WalletInfo { chain_id, owner };
        self.wallet = Some(wallet.clone());
        Ok(wallet)
    }

    fn disconnect(&mut self) {
        self.wallet = None;
    }

    fn execute_operation(
        &mut self,
        app_id: &str,
        operation: &Operation,
    ) -> Result<Value, ChainError> {
        let url = self.app_url(app_id)?;
        self.post(&url, &operation.to_graphql())
    }

    fn query(&mut self, app_id: &str, query: &str) -> Result<Value, ChainError> {
        let url = self.app_url(app_id)?;
        self.post(&url, query)
    }
}
