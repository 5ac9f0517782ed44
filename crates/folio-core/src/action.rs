//! Inline-button callback payloads.

use crate::catalog::Lang;
use thiserror::Error;

const LANG_PREFIX: &str = "lang_";
const ASK_QUESTION: &str = "ask_question";

/// What an inline button press asks the bot to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// `lang_<code>`: pick the display language.
    SelectLanguage(Lang),
    /// `ask_question`: switch to waiting for the user's question.
    AskQuestion,
}

/// A callback payload that maps to no [`CallbackAction`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized callback payload '{0}'")]
pub struct UnrecognizedAction(pub String);

impl CallbackAction {
    /// Parse a raw callback payload.
    pub fn parse(data: &str) -> Result<Self, UnrecognizedAction> {
        if data == ASK_QUESTION {
            return Ok(Self::AskQuestion);
        }
        data.strip_prefix(LANG_PREFIX)
            .and_then(Lang::from_code)
            .map(Self::SelectLanguage)
            .ok_or_else(|| UnrecognizedAction(data.to_string()))
    }

    /// The payload to attach to a button that triggers this action.
    pub fn payload(&self) -> String {
        match self {
            Self::SelectLanguage(lang) => format!("{LANG_PREFIX}{}", lang.code()),
            Self::AskQuestion => ASK_QUESTION.to_string(),
        }
    }
}
