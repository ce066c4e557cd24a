//! Localization strategy for language-specific markers and messages.

/// Strategy for handling language-specific document conventions.
pub trait LocalizationStrategy: Send + Sync {
    /// Headings that introduce a table of contents, lowercase.
    fn toc_markers(&self) -> &[&'static str];

    /// Default text of the review comment attached to runs with a wrong font.
    fn font_review_comment(&self) -> &'static str;

    /// Whether a paragraph's text is a table-of-contents heading.
    fn is_toc_marker(&self, text: &str) -> bool {
        let folded = text.trim().to_lowercase();
        self.toc_markers().iter().any(|marker| *marker == folded)
    }
}

/// Russian localization ("Оглавление", "Содержание").
pub struct RussianLocalization;

impl LocalizationStrategy for RussianLocalization {
    fn toc_markers(&self) -> &[&'static str] {
        &["оглавление", "содержание"]
    }

    fn font_review_comment(&self) -> &'static str {
        "Выберите корректный шрифт"
    }
}

/// English localization.
pub struct EnglishLocalization;

impl LocalizationStrategy for EnglishLocalization {
    fn toc_markers(&self) -> &[&'static str] {
        &["contents", "table of contents"]
    }

    fn font_review_comment(&self) -> &'static str {
        "Choose the correct font"
    }
}

/// Picks a strategy from a language code; unknown codes get Russian.
pub fn for_language(lang: &str) -> &'static dyn LocalizationStrategy {
    match lang.to_ascii_lowercase().as_str() {
        "en" | "eng" | "english" => &EnglishLocalization,
        _ => &RussianLocalization,
    }
}
