//! Application constants
//!
//! Centralized location for endpoint paths, defaults and the user-facing
//! messages the client surfaces.

// Base URL resolution
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEV_PROXY_BASE_URL: &str = DEFAULT_API_BASE_URL;

// Request defaults
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const UPLOAD_REQUEST_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;
pub const LOGIN_REDIRECT_DEBOUNCE_MS: u64 = 100;
pub const LOGIN_ROUTE: &str = "/login";

// Headers
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_REQUEST_ID: &str = "X-Request-Id";

// Loading-state keys
pub const LOADING_LOGIN: &str = "login";
pub const LOADING_LOGOUT: &str = "logout";
pub const LOADING_USER_INFO: &str = "getUserInfo";
pub const LOADING_CHANGE_PASSWORD: &str = "changePassword";
pub const LOADING_PRODUCTS: &str = "products";
pub const LOADING_RULES: &str = "rules";
pub const LOADING_DOCUMENT_UPLOAD: &str = "documentUpload";
pub const LOADING_AUDIT: &str = "audit";

/// REST endpoint paths, relative to the API base URL
pub mod endpoints {
    pub const AUTH_LOGIN: &str = "/auth/login";
    pub const AUTH_LOGOUT: &str = "/auth/logout";
    pub const AUTH_REFRESH: &str = "/auth/refresh";
    pub const AUTH_PROFILE: &str = "/auth/profile";
    pub const AUTH_CHECK: &str = "/auth/check";
    pub const AUTH_CHANGE_PASSWORD: &str = "/auth/change-password";
    pub const PRODUCTS: &str = "/products";
    pub const RULES: &str = "/rules";
    pub const DOCUMENTS: &str = "/documents";
    pub const DOCUMENT_UPLOAD: &str = "/documents/upload";
    pub const AUDITS: &str = "/audits";
}

/// User-facing messages, displayed verbatim by the UI layer
pub mod messages {
    pub const NETWORK_FAILED: &str = "网络连接失败，请检查网络后重试";
    pub const TIMEOUT: &str = "请求超时，请稍后重试";
    pub const SESSION_EXPIRED: &str = "登录已过期，请重新登录";
    pub const UNAUTHORIZED: &str = "未授权，请重新登录";
    pub const FORBIDDEN: &str = "没有权限执行该操作";
    pub const BAD_REQUEST: &str = "请求参数错误";
    pub const VALIDATION_FAILED: &str = "数据验证失败";
    pub const NOT_FOUND: &str = "请求的资源不存在";
    pub const SERVER_ERROR: &str = "服务器内部错误";
    pub const SERVICE_UNAVAILABLE: &str = "服务暂时不可用，请稍后重试";
    pub const OPERATION_FAILED: &str = "操作失败";
    pub const REQUEST_FAILED: &str = "请求失败";
    pub const MALFORMED_RESPONSE: &str = "服务器响应格式错误";
    pub const LOGOUT_SUCCESS: &str = "登出成功";
    pub const LOGIN_FAILED: &str = "登录失败";
}
