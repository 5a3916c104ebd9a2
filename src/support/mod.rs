//! Collaborators the framework core talks to through traits.

pub mod flash;
pub mod submissions;
pub mod translation;

pub use flash::{CookieFlashStore, FlashBag, FlashLevel, FlashMessage, FlashStore};
pub use submissions::{ContactSubmission, ContactSubmissions, LogSubmissions, SubmissionError};
pub use translation::{JsonTranslator, TranslationError, Translator};
