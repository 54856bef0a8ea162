//! Message tracing for diagnostic logs.
//!
//! Rendering never fails: a missing source yields [`NO_CONTENT`], and a source
//! that cannot be re-serialized yields a placeholder carrying the reason.
//! Bodies are logged as-is; nothing is redacted.

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

pub const NO_CONTENT: &str = "No content";

/// Render an XML fragment as indented UTF-8 text.
pub fn render(source: Option<&str>) -> String {
    let Some(source) = source else {
        return NO_CONTENT.to_string();
    };

    match reindent(source) {
        Ok(text) => text,
        Err(reason) => {
            tracing::warn!(error = %reason, "Failed to extract SOAP content");
            format!("Failed to extract content: {}", reason)
        }
    }
}

fn reindent(source: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Eof => break,
            event => writer.write_event(event).map_err(|e| e.to_string())?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())
}
