//! Internationalization (i18n) of interface labels

use std::collections::HashMap;

/// Built-in label tables, keyed by language code
const BUILTIN: &[(&str, &str)] = &[
    (
        "en",
        r#"
home: Home
load_more: Load more posts
loading: Loading...
reading_time: "%d min"
edited_on: "* edited on %s"
previous_post: Previous post
next_post: Next post
not_found: Post not found
not_found_hint: The post you are looking for does not exist or was unpublished.
back_home: Back to the home page
exit_preview: Exit preview mode
"#,
    ),
    (
        "pt-br",
        r#"
home: Início
load_more: Carregar mais posts
loading: Carregando...
reading_time: "%d min"
edited_on: "* editado em %s"
previous_post: Post anterior
next_post: Próximo post
not_found: Post não encontrado
not_found_hint: O post que você procura não existe ou foi despublicado.
back_home: Voltar para o início
exit_preview: Sair do modo Preview
"#,
    ),
];

/// Internationalization handler
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, HashMap<String, String>>,
}

impl I18n {
    /// Create a handler with the built-in tables loaded
    pub fn new(language: &str) -> Self {
        let mut translations = HashMap::new();
        for (lang, table) in BUILTIN {
            match serde_yaml::from_str::<HashMap<String, String>>(table) {
                Ok(data) => {
                    translations.insert(lang.to_string(), data);
                }
                Err(e) => tracing::warn!("Invalid built-in labels for {}: {}", lang, e),
            }
        }

        Self {
            language: normalize_language(language),
            translations,
        }
    }

    /// Override labels of the current language
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        let table = self.translations.entry(self.language.clone()).or_default();
        for (key, value) in overrides {
            table.insert(key.clone(), value.clone());
        }
        self
    }

    /// Get the current language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get a translation by key
    pub fn get(&self, key: &str) -> String {
        self.get_for_lang(&self.language, key)
    }

    /// Get a translation for a specific language
    pub fn get_for_lang(&self, lang: &str, key: &str) -> String {
        if let Some(value) = self.translations.get(lang).and_then(|t| t.get(key)) {
            return value.clone();
        }

        // Fallback to English
        if let Some(value) = self.translations.get("en").and_then(|t| t.get(key)) {
            return value.clone();
        }

        // Return key as fallback
        key.to_string()
    }

    /// Translation with `%d` replaced by a number
    pub fn get_count(&self, key: &str, count: u32) -> String {
        self.get(key).replace("%d", &count.to_string())
    }

    /// Translation with `%s` replaced by a value
    pub fn get_with(&self, key: &str, value: &str) -> String {
        self.get(key).replace("%s", value)
    }

    /// All translations for the current language, English filling the gaps
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        let mut result = self
            .translations
            .get(&self.language)
            .cloned()
            .unwrap_or_default();

        if self.language != "en" {
            if let Some(en) = self.translations.get("en") {
                for (k, v) in en {
                    result.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }
        }

        result
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("en")
    }
}

/// `pt_BR`, `pt-BR` and `pt-br` all select the same table
fn normalize_language(language: &str) -> String {
    language.trim().replace('_', "-").to_lowercase()
}
