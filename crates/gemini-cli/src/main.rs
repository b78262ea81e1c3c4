//! Gemini Studio CLI - terminal front end for the Gemini panels
//!
//! Usage:
//!     gemini-studio [OPTIONS] [COMMAND]
//!
//! Environment Variables:
//!     GOOGLE_API_KEY: API key (required, may live in a `.env` file)
//!     GEMINI_BASE_URL: API base URL (default: Gemini's OpenAI-compatible endpoint)
//!     GEMINI_CHAT_MODEL: Chat / Q&A model (default: gemini-1.5-pro)
//!     GEMINI_VISION_MODEL: Captioning model (default: gemini-1.5-flash)
//!     GEMINI_EMBEDDING_MODEL: Embedding model (default: text-embedding-004)
//!     GEMINI_MAX_TOKENS: Maximum tokens per reply (default: 2048)
//!     GEMINI_TEMPERATURE: Sampling temperature (default: 0.7)
//!     GEMINI_EXPORT_DIR: Directory for downloads and chat transcripts
//!
//! Command line flags override the environment; malformed numeric variables
//! fall back to their defaults.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use gemini_studio::{
    get_available_models, get_message, Block, Dashboard, ExportSaver, GeminiClient, GeminiConfig,
    Panel, PanelRequest, UploadedImage,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Gemini Studio - chat, captions, embeddings and Q&A with Gemini
#[derive(Parser, Debug)]
#[command(name = "gemini-studio")]
#[command(about = "Gemini Studio - chat, captions, embeddings and Q&A with Gemini")]
#[command(after_help = r#"Examples:
    # Pick a panel from the menu
    gemini-studio

    # Chat with the model
    gemini-studio chat

    # Caption an image and keep the 800x500 preview
    gemini-studio caption photo.jpg --preview-out preview.png

    # Embed text and save embeddings.txt
    gemini-studio --export-dir exports embed "The quick brown fox"

    # Ask a single question
    gemini-studio ask "Why is the sky blue?"

    # List vision-capable models
    gemini-studio models
"#)]
struct Cli {
    // Model options
    /// API key for the Gemini API [env: GOOGLE_API_KEY]
    #[arg(long)]
    api_key: Option<String>,

    /// API base URL [env: GEMINI_BASE_URL]
    #[arg(long)]
    base_url: Option<String>,

    /// Model for chat and questions [env: GEMINI_CHAT_MODEL]
    #[arg(long)]
    chat_model: Option<String>,

    /// Model for image captioning [env: GEMINI_VISION_MODEL]
    #[arg(long)]
    vision_model: Option<String>,

    /// Model for text embeddings [env: GEMINI_EMBEDDING_MODEL]
    #[arg(long)]
    embedding_model: Option<String>,

    /// Maximum tokens per reply [env: GEMINI_MAX_TOKENS]
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Sampling temperature [env: GEMINI_TEMPERATURE]
    #[arg(long)]
    temperature: Option<f32>,

    // Other options
    /// Directory to save downloads and chat transcripts (creates timestamped subdirectory per session)
    #[arg(long, env = "GEMINI_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    /// Check API connectivity before starting
    #[arg(long)]
    check: bool,

    /// Suppress progress messages
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Multi-turn chat
    Chat,
    /// Write a detailed caption for an image (jpg, jpeg or png)
    Caption {
        /// Image file
        image: PathBuf,
        /// Write the 800x500 preview to this path
        #[arg(long, value_name = "PATH")]
        preview_out: Option<PathBuf>,
    },
    /// Generate an embedding vector for text
    Embed {
        /// Text to embed
        text: String,
    },
    /// Ask a single question
    Ask {
        /// The question
        question: String,
    },
    /// List available vision models
    Models,
}

/// Terminal session state shared by the panels
struct App {
    dashboard: Dashboard,
    exporter: Option<ExportSaver>,
    quiet: bool,
}

impl App {
    fn spinner(&self, key: &str) {
        if !self.quiet {
            println!("{}", get_message(key));
        }
    }

    /// Print blocks, saving downloads when an export directory is configured
    async fn render(&mut self, blocks: &[Block]) -> Result<()> {
        for block in blocks {
            match block {
                Block::Title(title) => {
                    println!("{}", "=".repeat(50));
                    println!("{}", title);
                    println!("{}", "=".repeat(50));
                }
                Block::Markdown(text) | Block::Text(text) => println!("{}", text),
                Block::Chat { role, text } => println!("{}: {}", role, text),
                Block::Preview {
                    file_name,
                    width,
                    height,
                } => println!("[{} preview {}x{}]", file_name, width, height),
                Block::Info(text) => println!("\u{2139}\u{FE0F}  {}", text),
                Block::Success(text) => println!("\u{2705} {}", text),
                Block::Warning(text) => println!("\u{26A0}\u{FE0F}  {}", text),
                Block::Error(text) => eprintln!("\u{274C} {}", text),
                Block::Values(values) => println!("{:?}", values),
                Block::Download {
                    label,
                    file_name,
                    data,
                    ..
                } => match self.exporter.as_mut() {
                    Some(saver) => {
                        let path = saver.save_download(file_name, data).await?;
                        println!("{}: saved to {}", label, path.display());
                    }
                    None => println!("{}: pass --export-dir to save {}", label, file_name),
                },
            }
        }
        Ok(())
    }

    async fn save_transcript(&self) {
        if let (Some(saver), Some(session)) = (&self.exporter, self.dashboard.chat_session()) {
            match saver.save_transcript(session).await {
                Ok(path) => info!("Transcript saved to {}", path.display()),
                Err(e) => warn!("Failed to save transcript: {}", e),
            }
        }
    }

    /// Run the chat panel until the user leaves it
    async fn run_chat(&mut self) -> Result<()> {
        let blocks = self.dashboard.chat(None, None).await;
        self.render(&blocks).await?;
        println!("\nType a message, 'clear' to start over, or 'back' to leave the chat.\n");

        loop {
            let Some(prompt) = read_line(get_message("chat_placeholder"))? else {
                break;
            };
            if prompt.eq_ignore_ascii_case("back") || is_quit(&prompt) {
                break;
            }
            if prompt.is_empty() {
                continue;
            }
            if prompt.eq_ignore_ascii_case("clear") {
                self.dashboard.reset_chat();
                let blocks = self.dashboard.chat(None, None).await;
                self.render(&blocks).await?;
                continue;
            }

            self.spinner("thinking");
            print!("assistant: ");
            io::stdout().flush()?;
            let print_chunk: &mut (dyn FnMut(&str) + Send) = &mut |chunk: &str| {
                print!("{}", chunk);
                io::stdout().flush().ok();
            };
            let blocks = self
                .dashboard
                .chat(Some(prompt.as_str()), Some(print_chunk))
                .await;
            println!();

            // History and the streamed reply are already on screen
            let errors: Vec<Block> = blocks
                .into_iter()
                .filter(|b| matches!(b, Block::Error(_)))
                .collect();
            self.render(&errors).await?;
            self.save_transcript().await;
        }

        Ok(())
    }

    async fn run_caption(&mut self, image: &Path, preview_out: Option<&Path>) -> Result<()> {
        let image = match UploadedImage::open(image) {
            Ok(image) => image,
            Err(e) => {
                warn!("Cannot load {}: {}", image.display(), e);
                return self.render(&Dashboard::caption_error(&e)).await;
            }
        };

        if let Some(out) = preview_out {
            match image.save_preview(out) {
                Ok(()) => println!("Preview written to {}", out.display()),
                Err(e) => warn!("Failed to write preview: {}", e),
            }
        }

        self.spinner("analyzing_image");
        let blocks = self.dashboard.caption_image(&image).await;
        self.render(&blocks).await
    }

    async fn run_embed(&mut self, text: String) -> Result<()> {
        self.spinner("generating_embeddings");
        let blocks = self.dashboard.handle(PanelRequest::Embed { text }).await;
        self.render(&blocks).await
    }

    async fn run_ask(&mut self, question: String) -> Result<()> {
        self.spinner("generating_response");
        let blocks = self.dashboard.handle(PanelRequest::Ask { question }).await;
        self.render(&blocks).await
    }

    /// Sidebar menu loop
    async fn run_menu(&mut self) -> Result<()> {
        println!("\nType 'quit' to exit.");

        loop {
            print_menu();
            let Some(selection) = read_line("Select a panel [1]")? else {
                println!("\nGoodbye!");
                break;
            };
            if is_quit(&selection) {
                println!("Goodbye!");
                break;
            }

            let panel = if selection.is_empty() {
                Panel::default()
            } else {
                match Panel::from_selection(&selection) {
                    Some(panel) => panel,
                    None => {
                        println!("Unknown panel: {}", selection);
                        continue;
                    }
                }
            };

            match panel {
                Panel::ChatBot => self.run_chat().await?,
                Panel::ImageCaptioning => {
                    let path = read_line(get_message("upload_prompt"))?.unwrap_or_default();
                    if path.is_empty() {
                        let blocks = self
                            .dashboard
                            .handle(PanelRequest::Caption { image: None })
                            .await;
                        self.render(&blocks).await?;
                    } else {
                        self.run_caption(Path::new(&path), None).await?;
                    }
                }
                Panel::EmbedText => {
                    let text = read_line(get_message("embed_placeholder"))?.unwrap_or_default();
                    self.run_embed(text).await?;
                }
                Panel::AskMeAnything => {
                    let question = read_line(get_message("ask_placeholder"))?.unwrap_or_default();
                    self.run_ask(question).await?;
                }
            }
        }

        Ok(())
    }
}

fn print_menu() {
    println!();
    println!("{}", get_message("page_title"));
    println!("{}", "-".repeat(50));
    for (i, panel) in Panel::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, panel.label());
    }
    println!("{}", "-".repeat(50));
}

/// Prompt and read one trimmed line; `None` on EOF
fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{}: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    match io::stdin().lock().read_line(&mut input) {
        Ok(0) | Err(_) => Ok(None),
        Ok(_) => Ok(Some(input.trim().to_string())),
    }
}

fn is_quit(input: &str) -> bool {
    input.eq_ignore_ascii_case("quit")
        || input.eq_ignore_ascii_case("exit")
        || input.eq_ignore_ascii_case("q")
}

/// Check if the model API is accessible
async fn check_model_api(client: &GeminiClient) -> bool {
    let base_url = &client.config().base_url;
    println!("\u{1F50D} Checking model API...");
    println!("{}", "-".repeat(50));

    print!("1. Checking API connectivity ({})... ", base_url);
    io::stdout().flush().ok();

    match client.test_connection().await {
        Ok(()) => {
            println!("\u{2705} OK");
            println!("{}", "-".repeat(50));
            println!("\u{2705} Model API checks passed!\n");
            true
        }
        Err(e) => {
            println!("\u{274C} FAILED");
            let error_msg = e.to_string();

            if error_msg.contains("401") || error_msg.to_lowercase().contains("api key") {
                println!("   Error: The API key was rejected");
                println!("   Solution:");
                println!("     1. Check GOOGLE_API_KEY in your .env file");
                println!("     2. Create a key at https://aistudio.google.com/app/apikey");
            } else if error_msg.to_lowercase().contains("timeout") {
                println!("   Error: Connection to {} timed out", base_url);
                println!("   Solution:");
                println!("     1. Check your network connection");
                println!("     2. Verify the base URL is correct");
            } else {
                println!("   Error: {}", error_msg);
            }

            println!("{}", "-".repeat(50));
            println!("\u{274C} Model API check failed. Please fix the issues above.");
            false
        }
    }
}

/// Print application header
fn print_header(config: &GeminiConfig, export_dir: Option<&Path>) {
    println!("{}", "=".repeat(50));
    println!("\u{1F9E0} {}", get_message("page_title"));
    println!("{}", "=".repeat(50));
    println!("Chat Model: {}", config.chat_model);
    println!("Vision Model: {}", config.vision_model);
    println!("Embedding Model: {}", config.embedding_model);
    println!("Base URL: {}", config.base_url);
    if let Some(dir) = export_dir {
        println!("Export Dir: {}", dir.display());
    }
    println!("{}", "=".repeat(50));
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Build the config from the environment, then apply the flags that were passed
fn resolve_config<F>(args: &Cli, lookup: F) -> gemini_studio::Result<GeminiConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = GeminiConfig::from_lookup(|key| match key {
        "GOOGLE_API_KEY" => args.api_key.clone().or_else(|| lookup(key)),
        _ => lookup(key),
    })?;

    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(model) = &args.chat_model {
        config = config.with_chat_model(model);
    }
    if let Some(model) = &args.vision_model {
        config = config.with_vision_model(model);
    }
    if let Some(model) = &args.embedding_model {
        config = config.with_embedding_model(model);
    }
    if let Some(max_tokens) = args.max_tokens {
        config = config.with_max_tokens(max_tokens);
    }
    if let Some(temperature) = args.temperature {
        config = config.with_temperature(temperature);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    let args = Cli::parse();
    init_logging(args.verbose);

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let config = match resolve_config(&args, |key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(e) => bail!("{}", e),
    };

    let client = Arc::new(GeminiClient::new(config.clone()));

    if args.check && !check_model_api(&client).await {
        std::process::exit(1);
    }

    let exporter = match &args.export_dir {
        Some(dir) => Some(ExportSaver::new(dir).await?),
        None => None,
    };

    let mut app = App {
        dashboard: Dashboard::new(client.clone(), config.clone()),
        exporter,
        quiet: args.quiet,
    };

    match args.command {
        Some(Command::Chat) => {
            if !args.quiet {
                print_header(&config, args.export_dir.as_deref());
            }
            app.run_chat().await?;
        }
        Some(Command::Caption { image, preview_out }) => {
            app.run_caption(&image, preview_out.as_deref()).await?;
        }
        Some(Command::Embed { text }) => app.run_embed(text).await?,
        Some(Command::Ask { question }) => app.run_ask(question).await?,
        Some(Command::Models) => {
            let models = get_available_models(client.as_ref()).await;
            if models.is_empty() {
                println!("No vision models found.");
            } else {
                println!("Available vision models:");
                for model in models {
                    println!("  - {}", model);
                }
            }
        }
        None => {
            if !args.quiet {
                print_header(&config, args.export_dir.as_deref());
            }
            app.run_menu().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "gemini-studio",
            "--api-key",
            "k",
            "caption",
            "cat.png",
            "--preview-out",
            "p.png",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Caption { image, preview_out }) => {
                assert_eq!(image, PathBuf::from("cat.png"));
                assert_eq!(preview_out, Some(PathBuf::from("p.png")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_verbosity_counts() {
        let cli = Cli::try_parse_from(["gemini-studio", "-vv", "models"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Command::Models)));
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_malformed_temperature_falls_back() {
        let cli = Cli::try_parse_from(["gemini-studio", "models"]).unwrap();
        let config = resolve_config(
            &cli,
            env(&[
                ("GOOGLE_API_KEY", "env-key"),
                ("GEMINI_TEMPERATURE", "warm"),
                ("GEMINI_MAX_TOKENS", "-1"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 2048);
    }

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::try_parse_from([
            "gemini-studio",
            "--api-key",
            "flag-key",
            "--temperature",
            "0.2",
            "ask",
            "Why?",
        ])
        .unwrap();
        let config = resolve_config(
            &cli,
            env(&[
                ("GOOGLE_API_KEY", "env-key"),
                ("GEMINI_TEMPERATURE", "0.9"),
                ("GEMINI_CHAT_MODEL", "gemini-1.5-flash"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_key, "flag-key");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.chat_model, "gemini-1.5-flash");
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let cli = Cli::try_parse_from(["gemini-studio", "models"]).unwrap();
        let err = resolve_config(&cli, env(&[])).unwrap_err();
        assert_eq!(err.to_string(), "Please set your GOOGLE_API_KEY in the .env file");
    }

    #[test]
    fn test_is_quit() {
        assert!(is_quit("QUIT"));
        assert!(is_quit("q"));
        assert!(!is_quit("question"));
    }
}
