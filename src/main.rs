use anyhow::Result;
use clap::Parser;

use lingo_lens::{Config, ProviderConfig, logging, run, run_server, settings};

#[derive(Parser, Debug)]
#[command(
    name = "lingo-lens",
    version,
    about = "Extract text, pronunciation and translation from images with a vision LLM"
)]
struct Cli {
    /// Run the HTTP server instead of a one-shot extraction
    #[arg(long = "serve")]
    serve: bool,

    /// Address for the HTTP server
    #[arg(short = 'a', long = "addr", default_value = "127.0.0.1:5000")]
    addr: String,

    /// Image file to extract from (png/jpg/jpeg/webp)
    #[arg(short = 'd', long = "data")]
    data: Option<String>,

    /// Prompt override for the model
    #[arg(short = 'p', long = "prompt")]
    prompt: Option<String>,

    /// Gemini model name (default from settings, else gemini-1.5-pro)
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// API key (overrides GEMINI_API_KEY / GOOGLE_API_KEY)
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    if cli.serve {
        let settings_path = cli.read_settings.as_deref().map(std::path::Path::new);
        let settings = settings::load_settings(settings_path)?;
        let provider_config =
            ProviderConfig::resolve(&settings, cli.model.as_deref(), cli.key.as_deref())?;
        return run_server(settings, provider_config, cli.addr).await;
    }

    let output = run(Config {
        data: cli.data,
        prompt: cli.prompt,
        model: cli.model,
        key: cli.key,
        settings_path: cli.read_settings,
    })
    .await?;
    println!("{}", output);
    Ok(())
}
