//! Supported output languages.

/// A locale code and its human-readable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// Locale code, e.g. "pt-BR"
    pub code: &'static str,
    /// Name used in prompts, e.g. "Portuguese (Brazil)"
    pub name: &'static str,
}

/// Every language a story can be written in.
pub const LANGUAGES: &[Language] = &[
    Language { code: "en-US", name: "English (US)" },
    Language { code: "ar-EG", name: "Arabic (Egypt)" },
    Language { code: "de-DE", name: "German (Germany)" },
    Language { code: "es-MX", name: "Spanish (Mexico)" },
    Language { code: "fr-FR", name: "French (France)" },
    Language { code: "hi-IN", name: "Hindi (India)" },
    Language { code: "id-ID", name: "Indonesian (Indonesia)" },
    Language { code: "it-IT", name: "Italian (Italy)" },
    Language { code: "ja-JP", name: "Japanese (Japan)" },
    Language { code: "ko-KR", name: "Korean (South Korea)" },
    Language { code: "pt-BR", name: "Portuguese (Brazil)" },
    Language { code: "ru-RU", name: "Russian (Russia)" },
    Language { code: "ua-UA", name: "Ukrainian (Ukraine)" },
    Language { code: "vi-VN", name: "Vietnamese (Vietnam)" },
    Language { code: "zh-CN", name: "Chinese (China)" },
];

/// Prompt name for a locale code; unknown codes fall back to English.
///
/// # Examples
///
/// ```
/// use heroes_core::language_name;
///
/// assert_eq!(language_name("ja-JP"), "Japanese (Japan)");
/// assert_eq!(language_name("xx-XX"), "English");
/// ```
pub fn language_name(code: &str) -> &'static str {
    LANGUAGES
        .iter()
        .find(|lang| lang.code.eq_ignore_ascii_case(code))
        .map(|lang| lang.name)
        .unwrap_or("English")
}
