// Resume-coach prompt fragments for the Conversation Manager.

/// Synthesized first user turn sent right after a successful upload.
pub const SUMMARY_PROMPT: &str = "Please provide a comprehensive summary of this resume, \
    highlighting key strengths, experience, skills, and any areas that could be improved:";

/// Appended to the preamble on every follow-up request.
pub const HISTORY_LEAD_IN: &str = "Here is our conversation history:";

/// System-context preamble. Rebuilt for every request because the model keeps
/// no state between calls.
pub fn coach_preamble(resume_text: &str) -> String {
    format!(
        "You are an expert resume coach helping students improve their resumes. \n\
         Here is the student's resume:\n\n---\n{resume_text}\n---\n\n\
         Please provide constructive feedback and suggestions to improve the resume. Be specific and actionable."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_fences_resume_text() {
        let preamble = coach_preamble("Jane Doe\nRust");
        assert!(preamble.contains("---\nJane Doe\nRust\n---"));
        assert!(preamble.starts_with("You are an expert resume coach"));
    }
}
