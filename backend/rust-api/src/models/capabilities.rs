use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Feature capabilities of the current deployment as reported by the
/// capabilities Cloud Function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Capabilities {
    pub text_generation: bool,
    pub image_generation: bool,
    pub document_extraction: bool,
    pub knowledge_base_search: bool,
    pub models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_upload_mb: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Callable-function envelope: requests carry `data`, responses `result`.
#[derive(Debug, Serialize)]
pub struct CallableRequest<T: Serialize> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct CallableResponse<T> {
    pub result: T,
}

#[derive(Debug, Serialize)]
pub struct CapabilitiesResponse {
    pub capabilities: Capabilities,
    pub cached: bool,
}
