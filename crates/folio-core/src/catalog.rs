//! Text catalog: two static key→string bundles, one per display language.
//!
//! Bundles are flat JSON objects loaded once at startup. Both must define the
//! same key set and every key in [`REQUIRED_KEYS`]; the check runs at load
//! time so lookups on the event path never miss.

use crate::config::{shellexpand, LangsConfig};
use crate::error::FolioError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::info;

/// Bio/portfolio text shown after a language is picked.
pub const PORTFOLIO: &str = "portfolio";
/// Label of the "ask a question" button.
pub const ASK_QUESTION: &str = "ask_question";
/// Prompt shown while waiting for the user's question.
pub const ASK_QUESTION_PROMPT: &str = "ask_question_prompt";
/// Confirmation shown after the question was relayed.
pub const MESSAGE_SENT: &str = "message_sent";
/// Shown instead of [`MESSAGE_SENT`] when relaying failed and the
/// relay policy is `report`.
pub const MESSAGE_FAILED: &str = "message_failed";

/// Keys every bundle must define.
pub const REQUIRED_KEYS: &[&str] = &[PORTFOLIO, ASK_QUESTION, ASK_QUESTION_PROMPT, MESSAGE_SENT];

/// Supported display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Cn,
    En,
}

impl Lang {
    /// All languages, in the order their buttons are shown.
    pub const ALL: [Lang; 2] = [Lang::Cn, Lang::En];

    /// Used whenever a user has not picked a language yet.
    pub const FALLBACK: Lang = Lang::En;

    /// Wire code used in callback payloads and logs.
    pub fn code(self) -> &'static str {
        match self {
            Self::Cn => "cn",
            Self::En => "en",
        }
    }

    /// Button label on the language-choice prompt.
    pub fn flag(self) -> &'static str {
        match self {
            Self::Cn => "\u{1f1e8}\u{1f1f3}",
            Self::En => "\u{1f1fa}\u{1f1f8}",
        }
    }

    /// Parse a wire code. Only the two supported codes are accepted.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "cn" => Some(Self::Cn),
            "en" => Some(Self::En),
            _ => None,
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One language's key→text mapping.
pub type Bundle = HashMap<String, String>;

/// The loaded, validated pair of bundles. Immutable after construction.
#[derive(Debug, Clone)]
pub struct TextCatalog {
    cn: Bundle,
    en: Bundle,
}

impl TextCatalog {
    /// Load and validate both bundles from the configured paths.
    pub fn load(config: &LangsConfig) -> Result<Self, FolioError> {
        let cn = read_bundle(Lang::Cn, &shellexpand(&config.cn))?;
        let en = read_bundle(Lang::En, &shellexpand(&config.en))?;
        let catalog = Self::new(cn, en)?;
        info!(
            "text catalog loaded: {} keys per language ({}, {})",
            catalog.cn.len(),
            config.cn,
            config.en
        );
        Ok(catalog)
    }

    /// Build a catalog from in-memory JSON documents.
    pub fn from_json(cn: &str, en: &str) -> Result<Self, FolioError> {
        Self::new(parse_bundle(Lang::Cn, cn)?, parse_bundle(Lang::En, en)?)
    }

    /// Validate and wrap two already-parsed bundles.
    pub fn new(cn: Bundle, en: Bundle) -> Result<Self, FolioError> {
        let catalog = Self { cn, en };
        catalog.require(REQUIRED_KEYS)?;

        let cn_keys: BTreeSet<&str> = catalog.cn.keys().map(String::as_str).collect();
        let en_keys: BTreeSet<&str> = catalog.en.keys().map(String::as_str).collect();
        if cn_keys != en_keys {
            let only_cn: Vec<&str> = cn_keys.difference(&en_keys).copied().collect();
            let only_en: Vec<&str> = en_keys.difference(&cn_keys).copied().collect();
            return Err(FolioError::Catalog(format!(
                "bundles define different keys (only in cn: [{}], only in en: [{}])",
                only_cn.join(", "),
                only_en.join(", ")
            )));
        }

        Ok(catalog)
    }

    /// Fail unless every bundle defines all of `keys`.
    pub fn require(&self, keys: &[&str]) -> Result<(), FolioError> {
        for lang in Lang::ALL {
            let bundle = self.bundle(lang);
            let missing: Vec<&str> = keys
                .iter()
                .copied()
                .filter(|k| !bundle.contains_key(*k))
                .collect();
            if !missing.is_empty() {
                return Err(FolioError::Catalog(format!(
                    "{lang} bundle is missing required keys: {}",
                    missing.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Look up `key` in the bundle for `lang`.
    pub fn resolve(&self, lang: Lang, key: &str) -> Result<&str, FolioError> {
        self.bundle(lang)
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| FolioError::MissingKey {
                lang: lang.code().to_string(),
                key: key.to_string(),
            })
    }

    /// Number of keys per bundle.
    pub fn key_count(&self) -> usize {
        self.cn.len()
    }

    fn bundle(&self, lang: Lang) -> &Bundle {
        match lang {
            Lang::Cn => &self.cn,
            Lang::En => &self.en,
        }
    }
}

fn read_bundle(lang: Lang, path: &str) -> Result<Bundle, FolioError> {
    let path = Path::new(path);
    let content = std::fs::read_to_string(path).map_err(|e| {
        FolioError::Catalog(format!(
            "failed to read {lang} bundle {}: {e}",
            path.display()
        ))
    })?;
    parse_bundle(lang, &content)
}

fn parse_bundle(lang: Lang, content: &str) -> Result<Bundle, FolioError> {
    serde_json::from_str(content).map_err(|e| {
        FolioError::Catalog(format!(
            "{lang} bundle is not a flat JSON object of strings: {e}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CN: &str = r#"{
        "portfolio": "你好，我是开发者。",
        "ask_question": "提问",
        "ask_question_prompt": "请输入您的问题：",
        "message_sent": "您的留言已发送！"
    }"#;

    const EN: &str = r#"{
        "portfolio": "Hi, I'm a developer.",
        "ask_question": "Ask a question",
        "ask_question_prompt": "Type your question:",
        "message_sent": "Your message has been sent!"
    }"#;

    #[test]
    fn test_lang_codes() {
        assert_eq!(Lang::from_code("cn"), Some(Lang::Cn));
        assert_eq!(Lang::from_code("en"), Some(Lang::En));
        assert_eq!(Lang::from_code("fr"), None);
        assert_eq!(Lang::from_code("CN"), None);
        for lang in Lang::ALL {
            assert_eq!(Lang::from_code(lang.code()), Some(lang));
        }
    }

    #[test]
    fn test_lang_flags() {
        assert_eq!(Lang::Cn.flag(), "🇨🇳");
        assert_eq!(Lang::En.flag(), "🇺🇸");
    }

    #[test]
    fn test_resolve_uses_matching_bundle() {
        let catalog = TextCatalog::from_json(CN, EN).unwrap();
        assert_eq!(
            catalog.resolve(Lang::Cn, PORTFOLIO).unwrap(),
            "你好，我是开发者。"
        );
        assert_eq!(
            catalog.resolve(Lang::En, PORTFOLIO).unwrap(),
            "Hi, I'm a developer."
        );
        assert_eq!(catalog.resolve(Lang::Cn, ASK_QUESTION).unwrap(), "提问");
        assert_eq!(catalog.key_count(), 4);
    }

    #[test]
    fn test_resolve_unknown_key() {
        let catalog = TextCatalog::from_json(CN, EN).unwrap();
        let err = catalog.resolve(Lang::En, "nope").unwrap_err();
        assert!(matches!(
            err,
            FolioError::MissingKey { ref lang, ref key } if lang == "en" && key == "nope"
        ));
    }

    #[test]
    fn test_missing_required_key_rejected() {
        let en = r#"{"portfolio": "p", "ask_question": "a", "ask_question_prompt": "q"}"#;
        let cn = r#"{"portfolio": "p", "ask_question": "a", "ask_question_prompt": "q"}"#;
        let err = TextCatalog::from_json(cn, en).unwrap_err();
        assert!(matches!(err, FolioError::Catalog(_)));
        assert!(err.to_string().contains("message_sent"), "got: {err}");
    }

    #[test]
    fn test_mismatched_key_sets_rejected() {
        let en = r#"{
            "portfolio": "p", "ask_question": "a",
            "ask_question_prompt": "q", "message_sent": "s", "footer": "f"
        }"#;
        let err = TextCatalog::from_json(CN, en).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("only in en: [footer]"), "got: {msg}");
    }

    #[test]
    fn test_non_string_values_rejected() {
        let en = r#"{"portfolio": {"nested": true}}"#;
        let err = TextCatalog::from_json(CN, en).unwrap_err();
        assert!(matches!(err, FolioError::Catalog(_)));
        assert!(err.to_string().contains("en bundle"));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = TextCatalog::from_json("{not json", EN).unwrap_err();
        assert!(err.to_string().contains("cn bundle"));
    }

    #[test]
    fn test_require_extra_key() {
        let catalog = TextCatalog::from_json(CN, EN).unwrap();
        let err = catalog.require(&[MESSAGE_FAILED]).unwrap_err();
        assert!(err.to_string().contains("message_failed"));
    }

    #[test]
    fn test_load_from_files() {
        let tmp = tempfile::tempdir().unwrap();
        let cn_path = tmp.path().join("cn.json");
        let en_path = tmp.path().join("en.json");
        std::fs::write(&cn_path, CN).unwrap();
        std::fs::write(&en_path, EN).unwrap();

        let config = LangsConfig {
            cn: cn_path.to_string_lossy().to_string(),
            en: en_path.to_string_lossy().to_string(),
        };
        let catalog = TextCatalog::load(&config).unwrap();
        assert_eq!(catalog.resolve(Lang::En, MESSAGE_SENT).unwrap(), "Your message has been sent!");
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let en_path = tmp.path().join("en.json");
        std::fs::write(&en_path, EN).unwrap();

        let config = LangsConfig {
            cn: tmp.path().join("absent.json").to_string_lossy().to_string(),
            en: en_path.to_string_lossy().to_string(),
        };
        let err = TextCatalog::load(&config).unwrap_err();
        assert!(matches!(err, FolioError::Catalog(_)));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_shipped_bundles_are_consistent() {
        let catalog = TextCatalog::from_json(
            include_str!("../../../langs/cn.json"),
            include_str!("../../../langs/en.json"),
        )
        .unwrap();
        catalog.require(&[MESSAGE_FAILED]).unwrap();
    }
}
