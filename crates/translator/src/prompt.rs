/// MIME type of captured screenshots
pub const IMAGE_MIME_TYPE: &str = "image/png";

/// Instruction sent alongside a screenshot
pub fn translation_instruction(target_language: &str) -> String {
    format!(
        "Translate the text in this image to {}. Only provide the translation, no explanations.",
        target_language
    )
}

/// Merge a previous translation and a follow-up question into one prompt
pub fn compose_question(question: &str, context: &str) -> String {
    format!(
        "Based on this translation:\n\n{}\n\nUser question: {}\n\nProvide a helpful answer.",
        context, question
    )
}

/// `data:` URI for providers that take images by URL
pub fn png_data_uri(image_base64: &str) -> String {
    format!("data:{};base64,{}", IMAGE_MIME_TYPE, image_base64)
}
