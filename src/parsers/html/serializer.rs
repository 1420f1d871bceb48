use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{Handle, SerializableHandle};

use crate::core::PageTranslatorError;

/// 序列化文档
///
/// `document_encoding` 为空或无法识别时输出 UTF-8
pub fn serialize_document(
    document: &Handle,
    document_encoding: &str,
) -> Result<Vec<u8>, PageTranslatorError> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default()).map_err(|e| {
        PageTranslatorError::new(&format!("Unable to serialize DOM into buffer: {}", e))
    })?;

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            if encoding != encoding_rs::UTF_8 {
                let s: &str = &String::from_utf8_lossy(&buf);
                let (data, _, _) = encoding.encode(s);
                buf = data.into_owned();
            }
        }
    }

    Ok(buf)
}
