//! HTTP request pipeline
//!
//! Transport-agnostic: everything here talks to the network through the
//! [`HttpTransport`] port.

pub mod classify;
pub mod dispatcher;
pub mod ports;
pub mod refresh;
pub mod request;
pub mod retry;

pub use dispatcher::{ApiDispatcher, ApiDispatcherBuilder, RawResponse};
pub use ports::{HttpTransport, TransportError, TransportRequest, TransportResponse};
pub use refresh::{
    RefreshCoordinator, RefreshLease, RefreshOutcome, RefreshState, RefreshTicket, RefreshWaiter,
};
pub use request::{
    join_url, ApiRequest, FilePart, HttpMethod, MultipartForm, ProgressCallback, RequestBody,
    ResponseType, UploadProgress,
};
pub use retry::{RetryContext, RetryPolicy};
