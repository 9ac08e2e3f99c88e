use anyhow::Result;
use clap::Parser;
use granite_client::app::{App, ChatOptions, DEFAULT_SYSTEM_PROMPT};
use granite_client::models::{Config, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "granite-chat")]
#[command(about = "Ask an IBM Granite model a question through an OpenAI-style interface")]
struct CliArgs {
    /// User prompt to send.
    #[arg(value_name = "PROMPT")]
    prompt: String,

    /// System prompt; pass an empty string to omit it.
    #[arg(long, default_value = DEFAULT_SYSTEM_PROMPT)]
    system: String,

    /// Model ID, overriding GRANITE_MODEL.
    #[arg(long)]
    model: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Sent to Granite as repetition_penalty.
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f64,

    /// Print the full chat.completion JSON instead of just the reply text.
    #[arg(long)]
    json: bool,
}

impl CliArgs {
    fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            system: self.system.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "granite_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app = match App::new(&config).await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize client: {}", e);
            std::process::exit(1);
        }
    };

    match app.run(&args.prompt, &args.chat_options()).await {
        Ok(completion) => {
            info!("Completion received");
            if args.json {
                println!("{}", serde_json::to_string_pretty(&completion)?);
            } else {
                println!("{}", completion.content().unwrap_or_default());
            }
            Ok(())
        }
        Err(e) => {
            error!("Completion failed: {}", e);
            std::process::exit(1);
        }
    }
}
