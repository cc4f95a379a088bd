//! Resume-Update Heuristic.
//!
//! Decides whether an assistant reply carries a revised resume worth
//! re-rendering. Purely lexical, so it has false positives and negatives;
//! everything that depends on it goes through `looks_like_updated_resume`.

/// Phrases that announce a revised resume (matched case-insensitively).
pub const TRIGGER_PHRASES: &[&str] = &[
    "here's your updated resume",
    "here's the improved resume",
    "updated resume",
    "enhanced resume",
    "revised resume",
    "here's the formatted resume",
    "here's a better version",
    "here's an improved version",
    "revised version of your resume",
];

/// Section headers that suggest resume structure.
pub const SECTION_CUES: &[&str] = &["education", "experience", "skills"];

/// Bullet characters that, together with a section cue, suggest a list-shaped resume.
pub const BULLET_MARKERS: &[char] = &['•', '-', '*'];

/// True when the reply names a revised resume, or pairs a section header
/// with at least one bullet character.
pub fn looks_like_updated_resume(text: &str) -> bool {
    let lower = text.to_lowercase();

    let announces_revision = TRIGGER_PHRASES.iter().any(|phrase| lower.contains(phrase));
    let has_section = SECTION_CUES.iter().any(|cue| lower.contains(cue));
    let has_bullet = text.contains(BULLET_MARKERS);

    announces_revision || (has_section && has_bullet)
}
