use serde::Serialize;

use crate::parser::ParsedFields;

#[derive(Debug, Serialize)]
pub(crate) struct ExtractResponse {
    pub(crate) status: String,
    pub(crate) data: ParsedFields,
    pub(crate) prompt_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) model: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}
