use crate::providers::Provider;

use super::models::ExtractResponse;
use super::state::ServerState;
use super::util::{load_upload, resolve_tmp_dir};
use crate::data;

#[derive(Debug)]
pub(crate) struct ServerError {
    pub(crate) status: axum::http::StatusCode,
    pub(crate) message: String,
}

impl ServerError {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: axum::http::StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: axum::http::StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct UploadedImage {
    pub(crate) filename: String,
    pub(crate) bytes: Vec<u8>,
}

pub(crate) async fn extract_request<P: Provider>(
    state: &ServerState,
    provider: P,
    upload: UploadedImage,
    prompt_override: Option<String>,
) -> Result<ExtractResponse, ServerError> {
    if upload.filename.trim().is_empty() {
        return Err(ServerError::bad_request("no selected file"));
    }
    if !data::allowed_file(&upload.filename) {
        return Err(ServerError::bad_request(format!(
            "file type not allowed: {}",
            upload.filename
        )));
    }

    let tmp_dir = resolve_tmp_dir(&state.settings);
    let attachment = load_upload(&upload.bytes, &upload.filename, &tmp_dir)
        .map_err(|err| ServerError::bad_request(err.to_string()))?;

    let prompt = prompt_override
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| state.settings.extraction_prompt());

    let response = provider
        .append_user_input(prompt.clone())
        .append_user_data(attachment)
        .generate()
        .await
        .map_err(|err| ServerError::bad_gateway(err.to_string()))?;

    let fields = state.parser.parse(&response.text);
    Ok(ExtractResponse {
        status: "success".to_string(),
        data: fields,
        prompt_used: prompt,
        model: response.model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderConfig;
    use crate::parser::ResponseParser;
    use crate::providers::{ProviderFuture, ProviderResponse};
    use crate::settings::Settings;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[derive(Clone)]
    struct TestProvider {
        reply: String,
    }

    impl Provider for TestProvider {
        fn append_user_input(self, _input: String) -> Self {
            self
        }

        fn append_user_data(self, _data: data::DataAttachment) -> Self {
            self
        }

        fn generate(self) -> ProviderFuture {
            let reply = self.reply;
            Box::pin(async move {
                Ok(ProviderResponse {
                    text: reply,
                    model: Some("test".to_string()),
                    usage: None,
                })
            })
        }
    }

    fn build_state(tmp_dir: &std::path::Path) -> ServerState {
        let mut settings = Settings::default();
        settings.server_tmp_dir = Some(tmp_dir.to_string_lossy().to_string());
        let parser = ResponseParser::with_markers(settings.markers.clone());
        ServerState {
            settings,
            parser,
            provider_config: ProviderConfig {
                key: "test-key".to_string(),
                model: "test-model".to_string(),
            },
        }
    }

    fn png_upload() -> UploadedImage {
        UploadedImage {
            filename: "photo.png".to_string(),
            bytes: PNG_BYTES.to_vec(),
        }
    }

    #[tokio::test]
    async fn structured_reply_produces_all_three_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = build_state(dir.path());
        let provider = TestProvider {
            reply: "1. Text: Hello\n2. Pronunciation: /həˈloʊ/\n3. Translation: Xin chào"
                .to_string(),
        };
        let response = extract_request(&state, provider, png_upload(), None)
            .await
            .expect("extract");
        assert_eq!(response.status, "success");
        assert_eq!(response.data.text, "Hello");
        assert_eq!(response.data.pronunciation, "/həˈloʊ/");
        assert_eq!(response.data.translation, "Xin chào");
        assert!(response.prompt_used.contains("Vietnamese translation"));
    }

    #[tokio::test]
    async fn unstructured_reply_degrades_to_text_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = build_state(dir.path());
        let provider = TestProvider {
            reply: "no structure here".to_string(),
        };
        let response = extract_request(&state, provider, png_upload(), None)
            .await
            .expect("extract");
        assert_eq!(response.data.text, "no structure here");
        assert_eq!(response.data.pronunciation, "");
        assert_eq!(response.data.translation, "");
    }

    #[tokio::test]
    async fn prompt_override_is_forwarded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = build_state(dir.path());
        let provider = TestProvider {
            reply: "x".to_string(),
        };
        let response = extract_request(
            &state,
            provider,
            png_upload(),
            Some("read the sign".to_string()),
        )
        .await
        .expect("extract");
        assert_eq!(response.prompt_used, "read the sign");
    }

    #[tokio::test]
    async fn disallowed_extension_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = build_state(dir.path());
        let provider = TestProvider {
            reply: String::new(),
        };
        let upload = UploadedImage {
            filename: "notes.pdf".to_string(),
            bytes: PNG_BYTES.to_vec(),
        };
        let err = extract_request(&state, provider, upload, None)
            .await
            .expect_err("rejected");
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(err.message.contains("not allowed"));
    }

    #[tokio::test]
    async fn empty_filename_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = build_state(dir.path());
        let provider = TestProvider {
            reply: String::new(),
        };
        let upload = UploadedImage {
            filename: "  ".to_string(),
            bytes: PNG_BYTES.to_vec(),
        };
        let err = extract_request(&state, provider, upload, None)
            .await
            .expect_err("rejected");
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(err.message.contains("no selected file"));
    }
}
