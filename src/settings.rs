use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::parser::DEFAULT_PHONETIC_MARKERS;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

const DEFAULT_PROMPT: &str = "Extract the text from this image and answer in exactly this format:\n\
1. Text: <the text in the image>\n\
2. Pronunciation: <IPA pronunciation>\n\
3. Translation: <{language} translation>";

#[derive(Debug, Clone)]
pub struct Settings {
    pub prompt: Option<String>,
    pub target_language: String,
    pub markers: Vec<char>,
    pub model: Option<String>,
    pub server_tmp_dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt: None,
            target_language: "Vietnamese".to_string(),
            markers: DEFAULT_PHONETIC_MARKERS.to_vec(),
            model: None,
            server_tmp_dir: None,
        }
    }
}

impl Settings {
    /// The prompt sent with each image, with the target language filled in.
    pub fn extraction_prompt(&self) -> String {
        self.prompt
            .as_deref()
            .unwrap_or(DEFAULT_PROMPT)
            .replace("{language}", &self.target_language)
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    extract: Option<ExtractSettings>,
    provider: Option<ProviderSettings>,
    server: Option<ServerSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ExtractSettings {
    prompt: Option<String>,
    target_language: Option<String>,
    markers: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderSettings {
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSettings {
    tmp_dir: Option<String>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(extract) = incoming.extract {
            if let Some(prompt) = extract.prompt
                && !prompt.trim().is_empty()
            {
                self.prompt = Some(prompt);
            }
            if let Some(language) = extract.target_language
                && !language.trim().is_empty()
            {
                self.target_language = language;
            }
            if let Some(markers) = extract.markers {
                let markers = markers
                    .iter()
                    .filter_map(|value| value.chars().next())
                    .collect::<Vec<_>>();
                if !markers.is_empty() {
                    self.markers = markers;
                }
            }
        }
        if let Some(provider) = incoming.provider
            && let Some(model) = provider.model
            && !model.trim().is_empty()
        {
            self.model = Some(model);
        }
        if let Some(server) = incoming.server
            && let Some(tmp_dir) = server.tmp_dir
            && !tmp_dir.trim().is_empty()
        {
            self.server_tmp_dir = Some(tmp_dir);
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".lingo-lens"))
        }
    })
}
