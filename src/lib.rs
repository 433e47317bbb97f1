use anyhow::{Result, anyhow};
use serde_json::json;
use std::path::Path;

pub mod data;
pub mod logging;
pub mod parser;
pub mod providers;
mod server;
pub mod settings;
mod test_util;

pub use parser::{DEFAULT_PHONETIC_MARKERS, ParsedFields, ResponseParser};
pub use providers::{Gemini, Provider};
pub use server::run_server;

/// Remote model credentials and model choice, resolved once at startup and
/// passed to whatever drives the provider call.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub key: String,
    pub model: String,
}

impl ProviderConfig {
    pub fn resolve(
        settings: &settings::Settings,
        model_arg: Option<&str>,
        key_arg: Option<&str>,
    ) -> Result<Self> {
        let key = providers::resolve_key(key_arg)?;
        let model = model_arg
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| settings.model.clone())
            .unwrap_or_default();
        Ok(Self { key, model })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub data: Option<String>,
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub key: Option<String>,
    pub settings_path: Option<String>,
}

/// One-shot mode: extract the fields from a local image file and return
/// the same JSON document the server responds with.
pub async fn run(config: Config) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;

    let Some(data_path) = config.data.as_deref() else {
        return Err(anyhow!("no input image (use --data)"));
    };
    let attachment = data::load_attachment(Path::new(data_path))?;

    let provider_config =
        ProviderConfig::resolve(&settings, config.model.as_deref(), config.key.as_deref())?;
    let provider = Gemini::new(provider_config.key).with_model(provider_config.model);

    let prompt = config
        .prompt
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| settings.extraction_prompt());

    let response = provider
        .append_user_input(prompt.clone())
        .append_user_data(attachment)
        .generate()
        .await?;

    let parser = ResponseParser::with_markers(settings.markers.clone());
    let fields = parser.parse(&response.text);

    let body = json!({
        "status": "success",
        "data": fields,
        "prompt_used": prompt,
        "model": response.model,
    });
    Ok(serde_json::to_string_pretty(&body)?)
}
