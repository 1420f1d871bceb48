use std::error::Error;
use std::fmt;
use std::rc::Rc;

use encoding_rs::Encoding;

use crate::parsers::html::{get_charset, html_to_dom, serialize_document};
use crate::translation::{
    KeyValueStore, PageOutcome, SiteTranslator, TranslationBackend, TranslationConfig,
    TranslationError,
};

/// Represents errors that can occur while translating a document
#[derive(Debug)]
pub struct PageTranslatorError {
    details: String,
}

impl PageTranslatorError {
    pub fn new(msg: &str) -> PageTranslatorError {
        PageTranslatorError {
            details: msg.to_string(),
        }
    }
}

impl fmt::Display for PageTranslatorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for PageTranslatorError {}

impl From<TranslationError> for PageTranslatorError {
    fn from(error: TranslationError) -> Self {
        PageTranslatorError::new(&error.to_string())
    }
}

/// Options for a single document run
#[derive(Default, Clone, Debug)]
pub struct PageTranslatorOptions {
    /// Input charset; detected from `<meta charset>` when unset
    pub encoding: Option<String>,
    /// Language to switch to after the load step
    pub target_language: Option<String>,
}

/// Result of translating a document
#[derive(Debug)]
pub struct TranslatedDocument {
    pub data: Vec<u8>,
    pub encoding: String,
    pub load_outcome: Option<PageOutcome>,
    pub change_outcome: Option<PageOutcome>,
}

/// Picks the charset declared by the document, or falls back to UTF-8
pub fn detect_document_encoding(input_data: &[u8]) -> String {
    let dom = html_to_dom(input_data, "utf-8");

    match get_charset(&dom.document) {
        Some(charset) if Encoding::for_label(charset.as_bytes()).is_some() => charset,
        Some(charset) => {
            tracing::warn!("Unknown charset {:?}, reading document as UTF-8", charset);
            "utf-8".to_string()
        }
        None => "utf-8".to_string(),
    }
}

/// Runs the load step and an optional language change over raw HTML
///
/// Translation failures never abort the run; only an invalid configuration,
/// an unknown input encoding or a serialization failure is returned as an error.
pub async fn translate_document(
    input_data: &[u8],
    options: &PageTranslatorOptions,
    config: TranslationConfig,
    backend: Rc<dyn TranslationBackend>,
    store: Rc<dyn KeyValueStore>,
) -> Result<TranslatedDocument, PageTranslatorError> {
    let encoding = match &options.encoding {
        Some(label) => {
            if Encoding::for_label(label.as_bytes()).is_none() {
                return Err(PageTranslatorError::new(&format!(
                    "Unknown encoding: {}",
                    label
                )));
            }
            label.clone()
        }
        None => detect_document_encoding(input_data),
    };

    let dom = html_to_dom(input_data, &encoding);
    let site = SiteTranslator::new(dom.document.clone(), config, backend, store)?;

    let load_outcome = site.on_load().await;

    let change_outcome = match options.target_language.as_deref() {
        Some(lang) => site.on_language_change(lang).await,
        None => None,
    };

    let data = serialize_document(&dom.document, &encoding)?;

    Ok(TranslatedDocument {
        data,
        encoding,
        load_outcome,
        change_outcome,
    })
}
