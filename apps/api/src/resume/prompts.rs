// All LLM prompt constants for the resume module (extraction + LaTeX rendering).

/// Transcription instruction sent alongside the uploaded document part.
pub const EXTRACT_TEXT_PROMPT: &str = "You are a resume parsing expert. \
    Extract all text content from this resume and return ONLY the formatted text content, nothing else.";

/// Shared rules appended to every rendering prompt.
const TEMPLATE_RULES: &str = "\
- Use the same document class, packages, and preamble as the reference template
- Use the custom commands defined in the reference template: \\resumeSubheading, \\resumeProjectHeading, \\resumeItemListStart, \\resumeItemListEnd, \\resumeItem
- Match the formatting, spacing, and structure of the reference template
- Keep all custom LaTeX commands and styling from the reference template
- Fill in the resume content where appropriate in the template structure
- Do NOT create your own template - ONLY use the reference template structure";

const RETURN_FULL_DOCUMENT: &str = "Return the COMPLETE, valid LaTeX document following the reference \
    template structure exactly. Include the full preamble, all packages, and all custom commands from the \
    reference template.";

fn template_header(template: &str) -> String {
    format!(
        "You are a LaTeX resume formatting expert. Below is a professional resume template that you must follow EXACTLY.\n\n\
         Reference template (use this as the structure and formatting reference):\n```\n{template}\n```"
    )
}

/// Upload path: the resume itself travels as a separate document part.
pub fn render_document_prompt(template: &str) -> String {
    format!(
        "{}\n\nNow, take the resume content provided and reformat it to follow the reference template EXACTLY:\n{TEMPLATE_RULES}\n\n{RETURN_FULL_DOCUMENT}",
        template_header(template)
    )
}

/// Free-text path (`/render-latex`).
pub fn render_text_prompt(template: &str, resume_text: &str) -> String {
    format!(
        "{}\n\nNow, take the following resume content and reformat it to follow the reference template EXACTLY:\n{TEMPLATE_RULES}\n\nResume content to format:\n{resume_text}\n\n{RETURN_FULL_DOCUMENT}",
        template_header(template)
    )
}

/// Update path: original resume plus the assistant's revision.
pub fn render_update_prompt(template: &str, original_resume: &str, suggestion: &str) -> String {
    format!(
        "{}\n\nOriginal resume:\n{original_resume}\n\nUpdated resume with AI suggestions:\n{suggestion}\n\n\
         Now, take the updated resume content provided and reformat it to follow the reference template EXACTLY:\n{TEMPLATE_RULES}\n\
         - Maintain consistency with the original resume while incorporating the AI suggestions\n\n{RETURN_FULL_DOCUMENT}",
        template_header(template)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_template_verbatim() {
        let template = "\\documentclass{article}\n\\newcommand{\\resumeItem}[1]{#1}";
        for prompt in [
            render_document_prompt(template),
            render_text_prompt(template, "Jane Doe"),
            render_update_prompt(template, "old", "new"),
        ] {
            assert!(prompt.contains(template));
            assert!(prompt.contains("\\resumeSubheading"));
        }
    }

    #[test]
    fn test_update_prompt_carries_both_versions() {
        let prompt = render_update_prompt("T", "ORIGINAL-TEXT", "SUGGESTED-TEXT");
        let original_at = prompt.find("ORIGINAL-TEXT").unwrap();
        let suggested_at = prompt.find("SUGGESTED-TEXT").unwrap();
        assert!(original_at < suggested_at);
        assert!(prompt.contains("Maintain consistency with the original resume"));
    }
}
