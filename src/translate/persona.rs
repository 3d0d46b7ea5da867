/// System prompt used for a target language.
///
/// `override_prompt` replaces the built-in persona entirely. Japanese gets a
/// dedicated localization persona; every other language gets a generic one.
pub fn persona_prompt(target_language: &str, tone: &str, override_prompt: Option<&str>) -> String {
    if let Some(prompt) = override_prompt.filter(|p| !p.trim().is_empty()) {
        return prompt.to_string();
    }

    let language_name = language_code_to_name(target_language);

    if target_language.eq_ignore_ascii_case("ja") {
        format!(
            "You are a top-tier Japanese YouTuber (20s, energetic, trendsetter). \
             Your task is to RE-WRITE the following text into natural, viral Japanese with a {} tone. \
             CRITICAL RULES:\n\
             1. DO NOT translate literally. Adapt the underlying MEANING to Japanese internet culture.\n\
             2. Use natural sentence endings (～だよ, ～じゃん, ～でしょ) matching a high-energy vibe.\n\
             3. Use Japanese slang/memes (e.g., 草, 尊い, エモい, ww) where appropriate for emotion.\n\
             4. Maintain the original emotional peaks but express them in a Japanese way.\n\
             5. Optimize for 'Audio Flow' - strictly avoid stiff written-style Japanese.\n\
             6. If the source is boring, make it exciting.\n\
             Return ONLY the rewritten text.",
            tone
        )
    } else {
        format!(
            "You are a trendy YouTuber in {} ({}). \
             Translate the following text naturally into {} using local memes and a {} tone. \
             Return ONLY the translated text.",
            language_name, target_language, language_name, tone
        )
    }
}

/// Convert language code to full language name for clearer prompts
pub fn language_code_to_name(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "zh" => "Chinese".to_string(),
        "en" => "English".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "es" => "Spanish".to_string(),
        "ru" => "Russian".to_string(),
        "it" => "Italian".to_string(),
        "pt" => "Portuguese".to_string(),
        "pl" => "Polish".to_string(),
        "nl" => "Dutch".to_string(),
        "tr" => "Turkish".to_string(),
        "ar" => "Arabic".to_string(),
        "hi" => "Hindi".to_string(),
        "th" => "Thai".to_string(),
        "vi" => "Vietnamese".to_string(),
        "id" => "Indonesian".to_string(),
        "ms" => "Malay".to_string(),
        "sv" => "Swedish".to_string(),
        "uk" => "Ukrainian".to_string(),
        _ => code.to_string(), // Fallback to the code itself if not found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_japanese_persona() {
        let prompt = persona_prompt("ja", "casual", None);
        assert!(prompt.contains("Japanese YouTuber"));
        assert!(prompt.contains("DO NOT translate literally"));
        assert!(prompt.contains("casual tone"));
    }

    #[test]
    fn test_generic_persona_names_language() {
        let prompt = persona_prompt("es", "casual", None);
        assert!(prompt.contains("trendy YouTuber in Spanish (es)"));
    }

    #[test]
    fn test_override_replaces_persona() {
        let prompt = persona_prompt("ja", "casual", Some("You are a calm documentary narrator."));
        assert_eq!(prompt, "You are a calm documentary narrator.");

        let prompt = persona_prompt("ja", "casual", Some("   "));
        assert!(prompt.contains("Japanese YouTuber"));
    }

    #[test]
    fn test_unknown_code_falls_back() {
        assert_eq!(language_code_to_name("KO"), "Korean");
        assert_eq!(language_code_to_name("xx"), "xx");
    }
}
