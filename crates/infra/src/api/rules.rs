//! Compliance rule endpoints

use auditdesk_core::http::ApiRequest;
use auditdesk_domain::constants::{endpoints, LOADING_RULES};
use auditdesk_domain::{query_pairs, ApiError, ApiResponse, PageResult, Rule, RulePayload, RuleQuery};
use serde_json::{json, Value};
use tracing::instrument;

use super::client::ApiClient;

pub struct RulesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> RulesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn path(id: i64) -> String {
        format!("{}/{id}", endpoints::RULES)
    }

    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &RuleQuery) -> Result<ApiResponse<PageResult<Rule>>, ApiError> {
        let request = ApiRequest::get(endpoints::RULES).query_pairs(query_pairs(query));
        self.client.tracked(LOADING_RULES, || self.client.request(&request)).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    pub async fn get(&self, id: i64) -> Result<ApiResponse<Rule>, ApiError> {
        self.client.get(&Self::path(id)).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create(&self, payload: &RulePayload) -> Result<ApiResponse<Rule>, ApiError> {
        let request = ApiRequest::post(endpoints::RULES).json(payload)?;
        self.client.tracked(LOADING_RULES, || self.client.request(&request)).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: i64, payload: &RulePayload) -> Result<ApiResponse<Rule>, ApiError> {
        let request = ApiRequest::put(Self::path(id)).json(payload)?;
        self.client.tracked(LOADING_RULES, || self.client.request(&request)).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    pub async fn delete(&self, id: i64) -> Result<ApiResponse<()>, ApiError> {
        self.client.delete::<Value>(&Self::path(id)).await.map(ApiResponse::without_data)
    }

    /// Enable or disable a rule without touching its definition
    ///
    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self))]
    pub async fn set_enabled(&self, id: i64, enabled: bool) -> Result<ApiResponse<Rule>, ApiError> {
        let request =
            ApiRequest::patch(format!("{}/status", Self::path(id))).json(&json!({ "enabled": enabled }))?;
        self.client.request(&request).await
    }
}
