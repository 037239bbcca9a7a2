//! Authentication endpoints
//!
//! Login and password change surface every failure. Logout, the permission
//! fetch and the login-status check fail open to a safe default so local
//! cleanup and navigation are never blocked by a flaky backend.

use auditdesk_core::http::ApiRequest;
use auditdesk_domain::constants::{
    endpoints, messages, LOADING_CHANGE_PASSWORD, LOADING_LOGIN, LOADING_LOGOUT, LOADING_USER_INFO,
};
use auditdesk_domain::{
    ApiError, ApiResponse, ChangePasswordRequest, LoginData, LoginRequest, UserInfo,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::client::ApiClient;

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Sign in and store the returned credentials.
    ///
    /// A 401 here means wrong credentials, so it never triggers a token
    /// refresh or the login redirect.
    ///
    /// # Errors
    /// Any failure, with the backend's message when it sent one.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &LoginRequest) -> Result<ApiResponse<LoginData>, ApiError> {
        let request = ApiRequest::post(endpoints::AUTH_LOGIN).json(credentials)?.skip_auth_refresh();
        let response: ApiResponse<LoginData> =
            self.client.tracked(LOADING_LOGIN, || self.client.request(&request)).await?;

        let Some(data) = response.data.as_ref() else {
            return Err(ApiError::malformed("login response carried no token"));
        };

        let tokens = self.client.tokens();
        tokens.set_token(&data.token);
        if let Some(refresh_token) = data.refresh_token.as_deref() {
            tokens.set_refresh_token(refresh_token);
        }
        if let Some(user) = &data.user {
            tokens.set_user(user);
            tokens.set_permissions(&user.permissions);
        }

        info!("signed in");
        Ok(response)
    }

    /// Sign out. Never fails: local credentials are cleared regardless of
    /// what the backend says.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> ApiResponse<()> {
        let request = ApiRequest::post(endpoints::AUTH_LOGOUT).skip_auth_refresh();
        let result = self
            .client
            .tracked(LOADING_LOGOUT, || self.client.request::<Value>(&request))
            .await;

        self.client.tokens().clear();

        match result {
            Ok(response) => response.without_data(),
            Err(err) => {
                warn!(error = %err, kind = %err.kind, "logout request failed, signing out locally");
                ApiResponse::ok(None, messages::LOGOUT_SUCCESS)
            }
        }
    }

    /// Fetch the signed-in user's profile and cache it.
    ///
    /// # Errors
    /// Any failure from the profile endpoint.
    #[instrument(skip(self))]
    pub async fn get_user_info(&self) -> Result<ApiResponse<UserInfo>, ApiError> {
        let request = ApiRequest::get(endpoints::AUTH_PROFILE);
        let response: ApiResponse<UserInfo> =
            self.client.tracked(LOADING_USER_INFO, || self.client.request(&request)).await?;

        if let Some(user) = &response.data {
            self.client.tokens().set_user(user);
            self.client.tokens().set_permissions(&user.permissions);
        }
        Ok(response)
    }

    /// Permission codes of the signed-in user; an empty list on any failure.
    #[instrument(skip(self))]
    pub async fn get_user_permissions(&self) -> ApiResponse<Vec<String>> {
        let request = ApiRequest::get(endpoints::AUTH_PROFILE);
        match self.client.request::<UserInfo>(&request).await {
            Ok(response) => {
                let mut response = response.map(|user| user.permissions);
                let permissions = response.data.get_or_insert_with(Vec::new);
                self.client.tokens().set_permissions(permissions);
                response
            }
            Err(err) => {
                warn!(error = %err, kind = %err.kind, "permission fetch failed, assuming none");
                ApiResponse::ok(Some(Vec::new()), "")
            }
        }
    }

    /// Whether the stored token is still accepted; `false` on any failure.
    #[instrument(skip(self))]
    pub async fn check_login_status(&self) -> bool {
        if !self.client.tokens().is_authenticated() {
            return false;
        }

        let request = ApiRequest::get(endpoints::AUTH_CHECK);
        match self.client.request::<Value>(&request).await {
            Ok(response) => response.data.and_then(|v| v.as_bool()).unwrap_or(true),
            Err(err) => {
                warn!(error = %err, kind = %err.kind, "login status check failed");
                false
            }
        }
    }

    /// # Errors
    /// Any failure, including a wrong current password.
    #[instrument(skip(self, request))]
    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<ApiResponse<()>, ApiError> {
        let request = ApiRequest::post(endpoints::AUTH_CHANGE_PASSWORD).json(request)?;
        self.client
            .tracked(LOADING_CHANGE_PASSWORD, || self.client.request::<Value>(&request))
            .await
            .map(ApiResponse::without_data)
    }
}
