/// UI strings shown by the panels
use phf::phf_map;

pub static MESSAGES: phf::Map<&'static str, &'static str> = phf_map! {
    "page_title" => "Gemini AI",
    "menu_chatbot" => "ChatBot",
    "menu_image_captioning" => "Image Captioning",
    "menu_embed_text" => "Embed text",
    "menu_ask" => "Ask me anything",
    "title_chatbot" => "🤖 ChatBot",
    "title_image_captioning" => "📷 Snap Narrate",
    "title_embed_text" => "🔡 Embed Text",
    "title_ask" => "❓ Ask me a question",
    "chat_placeholder" => "Ask Gemini-Pro...",
    "embed_placeholder" => "Enter the text to get embeddings",
    "ask_placeholder" => "Ask me anything...",
    "upload_prompt" => "Upload an image...",
    "thinking" => "Thinking...",
    "analyzing_image" => "Analyzing image...",
    "generating_embeddings" => "Generating embeddings...",
    "generating_response" => "Generating response...",
    "warn_no_image" => "Please upload an image first",
    "warn_no_text" => "Please enter some text",
    "warn_no_question" => "Please enter a question",
    "embeddings_success" => "Embeddings generated successfully!",
    "first_values" => "First 10 values:",
    "download_label" => "Download embeddings",
    "caption_prompt" => "Write a detailed caption for this image",
};

/// Look up a UI string, empty when the key is unknown
pub fn get_message(key: &str) -> &'static str {
    MESSAGES.get(key).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_message() {
        assert_eq!(get_message("page_title"), "Gemini AI");
        assert_eq!(get_message("warn_no_image"), "Please upload an image first");
    }

    #[test]
    fn test_unknown_message_is_empty() {
        assert_eq!(get_message("no_such_key"), "");
    }
}
