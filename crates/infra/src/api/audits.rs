//! Audit workflow endpoints: check a product against a rule set

use auditdesk_core::http::ApiRequest;
use auditdesk_domain::constants::{endpoints, LOADING_AUDIT};
use auditdesk_domain::{ApiError, ApiResponse, AuditFinding, AuditRequest, AuditTask, PageResult};
use tracing::instrument;

use super::client::ApiClient;

pub struct AuditsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuditsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn path(id: i64) -> String {
        format!("{}/{id}", endpoints::AUDITS)
    }

    /// Start an audit; the backend answers with the queued task.
    ///
    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self, request), fields(product_id = request.product_id))]
    pub async fn start(&self, request: &AuditRequest) -> Result<ApiResponse<AuditTask>, ApiError> {
        let request = ApiRequest::post(endpoints::AUDITS).json(request)?;
        self.client.tracked(LOADING_AUDIT, || self.client.request(&request)).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    pub async fn list(&self, page: u32, page_size: u32) -> Result<ApiResponse<PageResult<AuditTask>>, ApiError> {
        let request = ApiRequest::get(endpoints::AUDITS)
            .query("page", page.to_string())
            .query("pageSize", page_size.to_string());
        self.client.request(&request).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    pub async fn get(&self, id: i64) -> Result<ApiResponse<AuditTask>, ApiError> {
        self.client.get(&Self::path(id)).await
    }

    /// Per-rule findings of a finished audit
    ///
    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self))]
    pub async fn results(&self, id: i64) -> Result<ApiResponse<Vec<AuditFinding>>, ApiError> {
        self.client.get(&format!("{}/results", Self::path(id))).await
    }

    /// Audit report file
    ///
    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self))]
    pub async fn export_report(&self, id: i64) -> Result<Vec<u8>, ApiError> {
        let request = ApiRequest::get(format!("{}/report", Self::path(id))).binary_response();
        self.client.tracked(LOADING_AUDIT, || self.client.download(&request)).await
    }
}
