//! Panel dispatcher: maps a menu selection and its input to display blocks

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::chat::{load_chat_model, translate_role, ChatSession};
use crate::config::{get_message, GeminiConfig};
use crate::embedding::{DOWNLOAD_FILE_NAME, DOWNLOAD_MIME, PREVIEW_LEN};
use crate::error::GeminiError;
use crate::model::GenerativeBackend;
use crate::service::{gemini_pro_response, gemini_pro_vision_response, generate_embeddings};
use crate::vision::{UploadedImage, PREVIEW_HEIGHT, PREVIEW_WIDTH};

/// Sidebar menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    ChatBot,
    ImageCaptioning,
    EmbedText,
    AskMeAnything,
}

impl Panel {
    /// Menu order
    pub const ALL: [Panel; 4] = [
        Panel::ChatBot,
        Panel::ImageCaptioning,
        Panel::EmbedText,
        Panel::AskMeAnything,
    ];

    /// Label shown in the menu
    pub fn label(&self) -> &'static str {
        match self {
            Self::ChatBot => get_message("menu_chatbot"),
            Self::ImageCaptioning => get_message("menu_image_captioning"),
            Self::EmbedText => get_message("menu_embed_text"),
            Self::AskMeAnything => get_message("menu_ask"),
        }
    }

    /// Heading shown at the top of the panel
    pub fn title(&self) -> &'static str {
        match self {
            Self::ChatBot => get_message("title_chatbot"),
            Self::ImageCaptioning => get_message("title_image_captioning"),
            Self::EmbedText => get_message("title_embed_text"),
            Self::AskMeAnything => get_message("title_ask"),
        }
    }

    /// Parse a menu selection: a label (case-insensitive) or a 1-based index
    pub fn from_selection(selection: &str) -> Option<Self> {
        let selection = selection.trim();
        if let Ok(index) = selection.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| Self::ALL.get(i))
                .copied();
        }
        Self::ALL
            .iter()
            .find(|p| p.label().eq_ignore_ascii_case(selection))
            .copied()
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One rendered element of a panel
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Markdown(String),
    Chat { role: String, text: String },
    Preview { file_name: String, width: u32, height: u32 },
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
    Text(String),
    Values(Vec<f32>),
    Download {
        label: String,
        file_name: String,
        mime: String,
        data: String,
    },
}

/// Raw bytes of a file chosen in the uploader
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// User input for one panel interaction
#[derive(Debug, Clone)]
pub enum PanelRequest {
    /// Show the chat; send `prompt` when present
    Chat { prompt: Option<String> },
    /// Caption the uploaded image, if any
    Caption { image: Option<ImageUpload> },
    Embed { text: String },
    Ask { question: String },
}

impl PanelRequest {
    pub fn panel(&self) -> Panel {
        match self {
            Self::Chat { .. } => Panel::ChatBot,
            Self::Caption { .. } => Panel::ImageCaptioning,
            Self::Embed { .. } => Panel::EmbedText,
            Self::Ask { .. } => Panel::AskMeAnything,
        }
    }
}

/// Routes panel requests to the model wrappers and keeps the chat transcript
pub struct Dashboard {
    backend: Arc<dyn GenerativeBackend>,
    config: GeminiConfig,
    chat_session: Option<ChatSession>,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn GenerativeBackend>, config: GeminiConfig) -> Self {
        Self {
            backend,
            config,
            chat_session: None,
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// The chat transcript, once the chat panel has been opened
    pub fn chat_session(&self) -> Option<&ChatSession> {
        self.chat_session.as_ref()
    }

    /// Forget the chat transcript
    pub fn reset_chat(&mut self) {
        self.chat_session = None;
    }

    /// Handle one interaction and return what to display
    pub async fn handle(&mut self, request: PanelRequest) -> Vec<Block> {
        debug!("Handling {} request", request.panel());
        match request {
            PanelRequest::Chat { prompt } => self.chat(prompt.as_deref(), None).await,
            PanelRequest::Caption { image } => self.caption(image).await,
            PanelRequest::Embed { text } => self.embed(&text).await,
            PanelRequest::Ask { question } => self.ask(&question).await,
        }
    }

    /// Chat panel; when `on_chunk` is given the reply is streamed through it
    pub async fn chat(
        &mut self,
        prompt: Option<&str>,
        on_chunk: Option<&mut (dyn FnMut(&str) + Send)>,
    ) -> Vec<Block> {
        let mut blocks = vec![Block::Title(Panel::ChatBot.title().to_string())];

        let model = match load_chat_model(&self.config) {
            Ok(model) => model,
            Err(e) => {
                blocks.push(Block::Error(format!(
                    "Error loading Gemini Pro model: {}",
                    e
                )));
                return blocks;
            }
        };

        let session = self
            .chat_session
            .get_or_insert_with(|| model.start_chat());

        for message in session.history() {
            blocks.push(Block::Chat {
                role: translate_role(message.role.as_str()),
                text: message.text().to_string(),
            });
        }

        let Some(prompt) = prompt.filter(|p| !p.trim().is_empty()) else {
            return blocks;
        };

        blocks.push(Block::Chat {
            role: "user".to_string(),
            text: prompt.to_string(),
        });

        let backend = self.backend.as_ref();
        let result = match on_chunk {
            Some(on_chunk) => {
                session
                    .send_message_streaming(backend, prompt, on_chunk)
                    .await
            }
            None => session.send_message(backend, prompt).await,
        };

        match result {
            Ok(reply) => blocks.push(Block::Chat {
                role: "assistant".to_string(),
                text: reply,
            }),
            Err(e) => blocks.push(Block::Error(format!("Error generating response: {}", e))),
        }

        blocks
    }

    async fn caption(&self, upload: Option<ImageUpload>) -> Vec<Block> {
        let Some(upload) = upload else {
            return vec![
                Block::Title(Panel::ImageCaptioning.title().to_string()),
                Block::Warning(get_message("warn_no_image").to_string()),
            ];
        };

        match UploadedImage::from_bytes(upload.file_name, &upload.bytes) {
            Ok(image) => self.caption_image(&image).await,
            Err(e) => Self::caption_error(&e),
        }
    }

    /// Caption an already decoded image
    pub async fn caption_image(&self, image: &UploadedImage) -> Vec<Block> {
        let inline = match image.to_inline() {
            Ok(inline) => inline,
            Err(e) => return Self::caption_error(&e),
        };

        let caption = gemini_pro_vision_response(
            self.backend.as_ref(),
            &self.config,
            get_message("caption_prompt"),
            inline,
        )
        .await;

        vec![
            Block::Title(Panel::ImageCaptioning.title().to_string()),
            Block::Preview {
                file_name: image.file_name().to_string(),
                width: PREVIEW_WIDTH,
                height: PREVIEW_HEIGHT,
            },
            Block::Info(caption),
        ]
    }

    /// Captioning panel for an upload that could not be read or decoded
    pub fn caption_error(err: &GeminiError) -> Vec<Block> {
        vec![
            Block::Title(Panel::ImageCaptioning.title().to_string()),
            Block::Error(format!("Error processing image: {}", err)),
        ]
    }

    async fn embed(&self, text: &str) -> Vec<Block> {
        let mut blocks = vec![Block::Title(Panel::EmbedText.title().to_string())];

        if text.trim().is_empty() {
            blocks.push(Block::Warning(get_message("warn_no_text").to_string()));
            return blocks;
        }

        match generate_embeddings(self.backend.as_ref(), &self.config, text).await {
            Ok(embedding) => {
                blocks.push(Block::Success(
                    get_message("embeddings_success").to_string(),
                ));
                blocks.push(Block::Text(format!(
                    "Embedding dimension: {}",
                    embedding.dimension()
                )));
                blocks.push(Block::Text(get_message("first_values").to_string()));
                blocks.push(Block::Values(embedding.preview(PREVIEW_LEN).to_vec()));
                blocks.push(Block::Download {
                    label: get_message("download_label").to_string(),
                    file_name: DOWNLOAD_FILE_NAME.to_string(),
                    mime: DOWNLOAD_MIME.to_string(),
                    data: embedding.to_download_text(),
                });
            }
            Err(message) => blocks.push(Block::Error(message)),
        }

        blocks
    }

    async fn ask(&self, question: &str) -> Vec<Block> {
        let mut blocks = vec![Block::Title(Panel::AskMeAnything.title().to_string())];

        if question.trim().is_empty() {
            blocks.push(Block::Warning(get_message("warn_no_question").to_string()));
            return blocks;
        }

        let response = gemini_pro_response(self.backend.as_ref(), &self.config, question).await;
        blocks.push(Block::Markdown(response));
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockBackend;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use std::io::Cursor;

    fn dashboard(backend: MockBackend) -> Dashboard {
        Dashboard::new(Arc::new(backend), GeminiConfig::new("test-key"))
    }

    fn png_upload() -> ImageUpload {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(8, 8, Rgb([0, 0, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        ImageUpload {
            file_name: "sky.png".to_string(),
            bytes,
        }
    }

    #[test]
    fn test_panel_selection() {
        assert_eq!(Panel::default(), Panel::ChatBot);
        assert_eq!(Panel::from_selection("2"), Some(Panel::ImageCaptioning));
        assert_eq!(Panel::from_selection("embed TEXT"), Some(Panel::EmbedText));
        assert_eq!(
            Panel::from_selection("Ask me anything"),
            Some(Panel::AskMeAnything)
        );
        assert_eq!(Panel::from_selection("0"), None);
        assert_eq!(Panel::from_selection("5"), None);
        assert_eq!(Panel::from_selection("settings"), None);
    }

    #[tokio::test]
    async fn test_chat_renders_history_then_new_turn() {
        let mut dash = dashboard(MockBackend::new().with_reply("Hi!").with_reply("Sure."));

        let first = dash
            .handle(PanelRequest::Chat {
                prompt: Some("Hello".to_string()),
            })
            .await;
        assert_eq!(first.len(), 3);

        let second = dash
            .handle(PanelRequest::Chat {
                prompt: Some("Help me?".to_string()),
            })
            .await;

        assert_eq!(second[0], Block::Title("🤖 ChatBot".to_string()));
        assert_eq!(
            second[2],
            Block::Chat {
                role: "assistant".to_string(),
                text: "Hi!".to_string()
            }
        );
        assert_eq!(
            second.last(),
            Some(&Block::Chat {
                role: "assistant".to_string(),
                text: "Sure.".to_string()
            })
        );
        assert_eq!(dash.chat_session().unwrap().history().len(), 4);
    }

    #[tokio::test]
    async fn test_reset_chat_starts_new_transcript() {
        let mut dash = dashboard(MockBackend::new().with_reply("Hi!"));
        dash.handle(PanelRequest::Chat {
            prompt: Some("Hello".to_string()),
        })
        .await;
        let first_id = dash.chat_session().unwrap().id();

        dash.reset_chat();
        assert!(dash.chat_session().is_none());

        let blocks = dash.handle(PanelRequest::Chat { prompt: None }).await;
        assert_eq!(blocks.len(), 1);
        assert_ne!(dash.chat_session().unwrap().id(), first_id);
    }

    #[tokio::test]
    async fn test_chat_without_prompt_only_renders() {
        let mut dash = dashboard(MockBackend::new());
        let blocks = dash.handle(PanelRequest::Chat { prompt: None }).await;
        assert_eq!(blocks.len(), 1);
        assert!(dash.chat_session().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_failure_shows_error() {
        let mut dash = dashboard(MockBackend::new().failing("offline"));
        let blocks = dash
            .handle(PanelRequest::Chat {
                prompt: Some("Hello".to_string()),
            })
            .await;

        assert!(matches!(
            blocks.last(),
            Some(Block::Error(msg)) if msg.starts_with("Error generating response: ")
        ));
    }

    #[tokio::test]
    async fn test_chat_with_blank_model_name() {
        let mut dash = Dashboard::new(
            Arc::new(MockBackend::new()),
            GeminiConfig::new("k").with_chat_model(""),
        );
        let blocks = dash.handle(PanelRequest::Chat { prompt: None }).await;
        assert!(matches!(
            &blocks[1],
            Block::Error(msg) if msg.starts_with("Error loading Gemini Pro model: ")
        ));
    }

    #[tokio::test]
    async fn test_caption_requires_image() {
        let mut dash = dashboard(MockBackend::new());
        let blocks = dash.handle(PanelRequest::Caption { image: None }).await;
        assert_eq!(
            blocks[1],
            Block::Warning("Please upload an image first".to_string())
        );
    }

    #[tokio::test]
    async fn test_caption_success() {
        let mut dash = dashboard(MockBackend::new().with_reply("A blue sky."));
        let blocks = dash
            .handle(PanelRequest::Caption {
                image: Some(png_upload()),
            })
            .await;

        assert!(matches!(
            &blocks[1],
            Block::Preview { width: 800, height: 500, .. }
        ));
        assert_eq!(blocks[2], Block::Info("A blue sky.".to_string()));
    }

    #[tokio::test]
    async fn test_caption_bad_upload() {
        let mut dash = dashboard(MockBackend::new());
        let blocks = dash
            .handle(PanelRequest::Caption {
                image: Some(ImageUpload {
                    file_name: "notes.txt".to_string(),
                    bytes: b"hello".to_vec(),
                }),
            })
            .await;

        assert!(matches!(
            &blocks[1],
            Block::Error(msg) if msg.starts_with("Error processing image: ")
        ));
    }

    #[test]
    fn test_unreadable_image_path_is_an_error() {
        let err = UploadedImage::open("no/such/dir/photo.png").unwrap_err();
        let blocks = Dashboard::caption_error(&err);

        assert_eq!(blocks.len(), 2);
        assert!(matches!(
            &blocks[1],
            Block::Error(msg) if msg.starts_with("Error processing image: IO error: ")
        ));
    }

    #[tokio::test]
    async fn test_caption_decoded_image() {
        let dash = dashboard(MockBackend::new().with_reply("Blue."));
        let upload = png_upload();
        let image = UploadedImage::from_bytes(upload.file_name, &upload.bytes).unwrap();

        let blocks = dash.caption_image(&image).await;
        assert_eq!(
            blocks[1],
            Block::Preview {
                file_name: "sky.png".to_string(),
                width: 800,
                height: 500
            }
        );
        assert_eq!(blocks[2], Block::Info("Blue.".to_string()));
    }

    #[tokio::test]
    async fn test_embed_blocks() {
        let values: Vec<f32> = (0..12).map(|i| i as f32 / 10.0).collect();
        let mut dash = dashboard(MockBackend::new().with_embedding(values));
        let blocks = dash
            .handle(PanelRequest::Embed {
                text: "some document".to_string(),
            })
            .await;

        assert_eq!(
            blocks[1],
            Block::Success("Embeddings generated successfully!".to_string())
        );
        assert_eq!(blocks[2], Block::Text("Embedding dimension: 12".to_string()));
        assert!(matches!(&blocks[4], Block::Values(v) if v.len() == 10));
        assert!(matches!(
            &blocks[5],
            Block::Download { file_name, mime, .. }
                if file_name == "embeddings.txt" && mime == "text/plain"
        ));
    }

    #[tokio::test]
    async fn test_embed_blank_and_failure() {
        let mut dash = dashboard(MockBackend::new().failing("nope"));

        let blank = dash
            .handle(PanelRequest::Embed {
                text: "   ".to_string(),
            })
            .await;
        assert_eq!(blank[1], Block::Warning("Please enter some text".to_string()));

        let failed = dash
            .handle(PanelRequest::Embed {
                text: "doc".to_string(),
            })
            .await;
        assert!(matches!(
            &failed[1],
            Block::Error(msg) if msg.starts_with("Error generating embeddings: ")
        ));
    }

    #[tokio::test]
    async fn test_ask() {
        let mut dash = dashboard(MockBackend::new().with_reply("**Paris**"));

        let blank = dash
            .handle(PanelRequest::Ask {
                question: String::new(),
            })
            .await;
        assert_eq!(blank[1], Block::Warning("Please enter a question".to_string()));

        let answered = dash
            .handle(PanelRequest::Ask {
                question: "Capital of France?".to_string(),
            })
            .await;
        assert_eq!(answered[1], Block::Markdown("**Paris**".to_string()));
    }
}
