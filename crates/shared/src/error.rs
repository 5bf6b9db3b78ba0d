use serde::{Deserialize, Serialize};

/// Error body the backend attaches to non-2xx responses. The `detail`
/// string is meant for direct display to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}

impl ApiErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
