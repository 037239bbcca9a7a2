//! Insurance product endpoints

use auditdesk_core::http::ApiRequest;
use auditdesk_domain::constants::{endpoints, LOADING_PRODUCTS};
use auditdesk_domain::{query_pairs, ApiError, ApiResponse, PageResult, Product, ProductPayload, ProductQuery};
use serde_json::Value;
use tracing::instrument;

use super::client::ApiClient;

pub struct ProductsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ProductsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ProductQuery) -> Result<ApiResponse<PageResult<Product>>, ApiError> {
        let request = ApiRequest::get(endpoints::PRODUCTS).query_pairs(query_pairs(query));
        self.client.tracked(LOADING_PRODUCTS, || self.client.request(&request)).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    pub async fn get(&self, id: i64) -> Result<ApiResponse<Product>, ApiError> {
        self.client.get(&format!("{}/{id}", endpoints::PRODUCTS)).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self, payload), fields(code = %payload.code))]
    pub async fn create(&self, payload: &ProductPayload) -> Result<ApiResponse<Product>, ApiError> {
        let request = ApiRequest::post(endpoints::PRODUCTS).json(payload)?;
        self.client.tracked(LOADING_PRODUCTS, || self.client.request(&request)).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: i64, payload: &ProductPayload) -> Result<ApiResponse<Product>, ApiError> {
        let request = ApiRequest::put(format!("{}/{id}", endpoints::PRODUCTS)).json(payload)?;
        self.client.tracked(LOADING_PRODUCTS, || self.client.request(&request)).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<ApiResponse<()>, ApiError> {
        let path = format!("{}/{id}", endpoints::PRODUCTS);
        self.client.delete::<Value>(&path).await.map(ApiResponse::without_data)
    }
}
