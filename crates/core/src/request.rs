//! Render request construction and default substitution.
//!
//! A [`JobRequest`] is an immutable value built fresh per submission.
//! Callers may leave any field blank; the constructor substitutes the
//! documented defaults so the rendering service never receives empty
//! strings.

// ---------------------------------------------------------------------------
// Request defaults
// ---------------------------------------------------------------------------

/// Title used when the caller leaves it blank.
pub const DEFAULT_TITLE: &str = "Untitled avatar video";
/// Script read by the avatar when none is provided.
pub const DEFAULT_SCRIPT_TEXT: &str =
    "Hello! This is an automatically generated avatar video.";
/// Avatar identifier used when none is provided.
pub const DEFAULT_AVATAR_ID: &str = "anna_costume1_cameraA";
/// Background sentinel accepted by the rendering service.
pub const DEFAULT_BACKGROUND: &str = "green_screen";
/// Fixed description attached to every render request.
pub const REQUEST_DESCRIPTION: &str = "Created via canvas plugin";

// ---------------------------------------------------------------------------
// JobRequest
// ---------------------------------------------------------------------------

/// Parameters for one remote render job.
///
/// Construct via [`JobRequest::new`], which applies the defaults above
/// to blank fields. The value is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    /// Human-readable title; also used to name the host placeholder.
    pub title: String,
    /// Script spoken by the avatar.
    pub script_text: String,
    /// Rendering-service avatar identifier.
    pub avatar_id: String,
    /// Background identifier or the `green_screen` sentinel.
    pub background: String,
}

impl JobRequest {
    /// Build a request, substituting defaults for blank fields.
    ///
    /// A field counts as blank when it is empty or whitespace-only.
    pub fn new(
        title: impl Into<String>,
        script_text: impl Into<String>,
        avatar_id: impl Into<String>,
        background: impl Into<String>,
    ) -> Self {
        Self {
            title: or_default(title.into(), DEFAULT_TITLE),
            script_text: or_default(script_text.into(), DEFAULT_SCRIPT_TEXT),
            avatar_id: or_default(avatar_id.into(), DEFAULT_AVATAR_ID),
            background: or_default(background.into(), DEFAULT_BACKGROUND),
        }
    }
}

/// Return `value` unless it is blank, in which case return `default`.
fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_get_defaults() {
        let request = JobRequest::new("", "", "", "");
        assert_eq!(request.title, DEFAULT_TITLE);
        assert_eq!(request.script_text, DEFAULT_SCRIPT_TEXT);
        assert_eq!(request.avatar_id, DEFAULT_AVATAR_ID);
        assert_eq!(request.background, DEFAULT_BACKGROUND);
    }

    #[test]
    fn whitespace_only_counts_as_blank() {
        let request = JobRequest::new("   ", "\t", " \n ", "  ");
        assert_eq!(request.title, DEFAULT_TITLE);
        assert_eq!(request.script_text, DEFAULT_SCRIPT_TEXT);
        assert_eq!(request.avatar_id, DEFAULT_AVATAR_ID);
        assert_eq!(request.background, DEFAULT_BACKGROUND);
    }

    #[test]
    fn provided_fields_are_preserved() {
        let request = JobRequest::new(
            "Launch teaser",
            "Welcome to the launch.",
            "marcus_suit_cameraB",
            "office",
        );
        assert_eq!(request.title, "Launch teaser");
        assert_eq!(request.script_text, "Welcome to the launch.");
        assert_eq!(request.avatar_id, "marcus_suit_cameraB");
        assert_eq!(request.background, "office");
    }

    #[test]
    fn mixed_blank_and_provided_fields() {
        let request = JobRequest::new("Launch teaser", "", "marcus_suit_cameraB", "");
        assert_eq!(request.title, "Launch teaser");
        assert_eq!(request.script_text, DEFAULT_SCRIPT_TEXT);
        assert_eq!(request.avatar_id, "marcus_suit_cameraB");
        assert_eq!(request.background, DEFAULT_BACKGROUND);
    }
}
