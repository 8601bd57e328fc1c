// src/generate/prompt.rs
// Renders a GenerationContext into the user message sent to the model.

use std::fmt::Write;

use super::GenerationContext;

pub const SYSTEM_PROMPT: &str = "You write README files for software repositories. \
Use only the file tree and key files you are given; do not invent features. \
Answer with the README in Markdown and nothing else.";

pub fn render_user_prompt(context: &GenerationContext, guidance: &str) -> String {
    let mut prompt = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(prompt, "Repository: {}", context.repository_name);
    if let Some(description) = &context.description {
        let _ = writeln!(prompt, "Description: {}", description);
    }

    let _ = writeln!(prompt, "\nFile tree ({} entries):", context.extraction.tree.len());
    for path in &context.extraction.tree {
        let _ = writeln!(prompt, "{}", path);
    }

    if !context.extraction.files.is_empty() {
        let _ = writeln!(prompt, "\nKey files:");
        for file in &context.extraction.files {
            let _ = writeln!(prompt, "\n--- {} ---\n{}", file.path, file.content.trim_end());
        }
    }

    let guidance = guidance.trim();
    if !guidance.is_empty() {
        let _ = writeln!(prompt, "\nAdditional instructions:\n{}", guidance);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractionResult, FetchedFile};

    fn context() -> GenerationContext {
        GenerationContext {
            repository_name: "acme/widget".to_string(),
            description: Some("Widgets for everyone".to_string()),
            extraction: ExtractionResult {
                tree: vec!["package.json".to_string(), "src".to_string()],
                files: vec![FetchedFile {
                    path: "package.json".to_string(),
                    content: "{\"name\":\"widget\"}\n".to_string(),
                }],
            },
        }
    }

    #[test]
    fn test_prompt_contains_tree_files_and_guidance() {
        let prompt = render_user_prompt(&context(), "Mention the MIT license.");
        assert!(prompt.starts_with("Repository: acme/widget\nDescription: Widgets for everyone\n"));
        assert!(prompt.contains("File tree (2 entries):\npackage.json\nsrc\n"));
        assert!(prompt.contains("--- package.json ---\n{\"name\":\"widget\"}\n"));
        assert!(prompt.ends_with("Additional instructions:\nMention the MIT license.\n"));
    }

    #[test]
    fn test_prompt_skips_empty_sections() {
        let mut context = context();
        context.description = None;
        context.extraction.files.clear();

        let prompt = render_user_prompt(&context, "   ");
        assert!(!prompt.contains("Description:"));
        assert!(!prompt.contains("Key files:"));
        assert!(!prompt.contains("Additional instructions"));
    }
}
