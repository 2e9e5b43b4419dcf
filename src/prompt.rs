//! Fixed prompt templates. User text is inserted verbatim.

const CLOSING: &str = "Provide a detailed, user-friendly, and actionable response.";

pub fn video_prompt(query: &str) -> String {
    format!(
        "Analyze the uploaded video for content and context.\n\
         Respond to the following query using video insights and supplementary web research:\n\
         {query}\n\
         \n\
         {CLOSING}\n"
    )
}

pub fn image_prompt(query: &str) -> String {
    format!(
        "Analyze the uploaded image for content and context.\n\
         Perform OCR if text is present or describe the image otherwise.\n\
         Respond to the following query using image insights:\n\
         {query}\n\
         \n\
         {CLOSING}\n"
    )
}

/// Blank `instructions` leave an empty line where they would go.
pub fn text_prompt(text: &str, instructions: Option<&str>) -> String {
    let instructions = instructions
        .filter(|i| !i.trim().is_empty())
        .unwrap_or_default();
    format!(
        "Summarize the following text in a concise, clear, and user-friendly manner.\n\
         {instructions}\n\
         \n\
         Text to summarize:\n\
         {text}\n"
    )
}
