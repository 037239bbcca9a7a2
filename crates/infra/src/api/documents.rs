//! Policy document endpoints: upload, parsing and download

use auditdesk_core::http::{ApiRequest, FilePart, MultipartForm, ProgressCallback};
use auditdesk_domain::constants::{endpoints, LOADING_DOCUMENT_UPLOAD};
use auditdesk_domain::{query_pairs, ApiError, ApiResponse, Document, DocumentQuery, PageResult};
use serde_json::Value;
use tracing::{info, instrument};

use super::client::ApiClient;

/// A file to upload, optionally linked to a product
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file: FilePart,
    pub product_id: Option<i64>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self { file: FilePart::new("file", file_name, content), product_id: None }
    }

    #[must_use]
    pub fn product(mut self, product_id: i64) -> Self {
        self.product_id = Some(product_id);
        self
    }

    #[must_use]
    pub fn mime_type(mut self, mime: impl Into<String>) -> Self {
        self.file = self.file.mime_type(mime);
        self
    }

    fn into_form(self) -> MultipartForm {
        let form = MultipartForm::new().file(self.file);
        match self.product_id {
            Some(id) => form.text("productId", id.to_string()),
            None => form,
        }
    }
}

pub struct DocumentsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DocumentsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn path(id: i64) -> String {
        format!("{}/{id}", endpoints::DOCUMENTS)
    }

    /// Upload a document as multipart form data with the long upload
    /// timeout, reporting progress through `progress` when given.
    ///
    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self, upload, progress), fields(file = %upload.file.file_name))]
    pub async fn upload(
        &self,
        upload: DocumentUpload,
        progress: Option<ProgressCallback>,
    ) -> Result<ApiResponse<Document>, ApiError> {
        let mut request = ApiRequest::post(endpoints::DOCUMENT_UPLOAD)
            .multipart(upload.into_form())
            .timeout(self.client.dispatcher().upload_timeout());
        if let Some(progress) = progress {
            request = request.on_progress(progress);
        }

        let response: ApiResponse<Document> = self
            .client
            .tracked(LOADING_DOCUMENT_UPLOAD, || self.client.request(&request))
            .await?;
        info!(id = response.data.as_ref().map(|d| d.id), "document uploaded");
        Ok(response)
    }

    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &DocumentQuery) -> Result<ApiResponse<PageResult<Document>>, ApiError> {
        let request = ApiRequest::get(endpoints::DOCUMENTS).query_pairs(query_pairs(query));
        self.client.request(&request).await
    }

    /// Ask the backend to (re)parse a document; uses the long timeout.
    ///
    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self))]
    pub async fn parse(&self, id: i64) -> Result<ApiResponse<Document>, ApiError> {
        let request = ApiRequest::post(format!("{}/parse", Self::path(id)))
            .timeout(self.client.dispatcher().upload_timeout());
        self.client.request(&request).await
    }

    /// Raw file content
    ///
    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self))]
    pub async fn download(&self, id: i64) -> Result<Vec<u8>, ApiError> {
        let request = ApiRequest::get(format!("{}/download", Self::path(id))).binary_response();
        self.client.download(&request).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    pub async fn delete(&self, id: i64) -> Result<ApiResponse<()>, ApiError> {
        self.client.delete::<Value>(&Self::path(id)).await.map(ApiResponse::without_data)
    }
}
