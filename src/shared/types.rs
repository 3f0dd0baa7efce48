use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    /// Machine-readable error kind (e.g. `LINK_EXPIRED`), only set on failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            code: None,
            meta,
            errors: None,
        }
    }

    pub fn error_with_code(
        message: Option<String>,
        code: Option<String>,
        errors: Option<Vec<String>>,
    ) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            code,
            meta: None,
            errors,
        }
    }
}
