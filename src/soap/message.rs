//! SOAP 1.1 envelope reading and writing.
//!
//! A [`SoapMessage`] keeps the header block and the body payload as raw XML
//! fragments. The payload's root element name is resolved against the envelope's
//! namespace declarations while parsing, so callers can check it without
//! re-parsing the fragment in context.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use quick_xml::Writer;

use crate::soap::types::{QualifiedName, SoapError, SoapFault, SOAP_ENV_NS};

const SOAP12_ENV_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
const ENV_PREFIX: &str = "soapenv";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SoapMessage {
    header: Option<String>,
    payload: Option<String>,
    payload_name: Option<QualifiedName>,
    fault: Option<SoapFault>,
}

impl SoapMessage {
    /// A message carrying one payload element.
    pub fn with_payload(payload: impl Into<String>, name: QualifiedName) -> Self {
        Self {
            payload: Some(payload.into()),
            payload_name: Some(name),
            ..Self::default()
        }
    }

    /// A message whose body is a fault.
    pub fn with_fault(fault: SoapFault) -> Self {
        Self {
            fault: Some(fault),
            ..Self::default()
        }
    }

    pub fn set_header(&mut self, header: impl Into<String>) {
        self.header = Some(header.into());
    }

    /// The body's payload element as XML.
    pub fn payload_source(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn payload_name(&self) -> Option<&QualifiedName> {
        self.payload_name.as_ref()
    }

    /// The `Header` element as XML, if the envelope has a non-empty one.
    pub fn header_source(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn fault(&self) -> Option<&SoapFault> {
        self.fault.as_ref()
    }

    pub fn has_fault(&self) -> bool {
        self.fault.is_some()
    }

    /// Serialize the full envelope.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push_str(&format!(
            r#"<{p}:Envelope xmlns:{p}="{ns}">"#,
            p = ENV_PREFIX,
            ns = SOAP_ENV_NS
        ));
        if let Some(header) = &self.header {
            xml.push_str(header);
        }
        xml.push_str(&format!("<{}:Body>", ENV_PREFIX));
        if let Some(fault) = &self.fault {
            xml.push_str(&format!(
                "<{p}:Fault><faultcode>{}</faultcode><faultstring>{}</faultstring>",
                escape(fault.code.as_str()),
                escape(fault.reason.as_str()),
                p = ENV_PREFIX
            ));
            if let Some(detail) = &fault.detail {
                xml.push_str(detail);
            }
            xml.push_str(&format!("</{}:Fault>", ENV_PREFIX));
        } else if let Some(payload) = &self.payload {
            xml.push_str(payload);
        }
        xml.push_str(&format!("</{p}:Body></{p}:Envelope>", p = ENV_PREFIX));
        xml
    }

    /// Parse a SOAP 1.1 (or 1.2) envelope.
    pub fn parse(xml: &[u8]) -> Result<Self, SoapError> {
        let text = std::str::from_utf8(xml).map_err(SoapError::xml)?;
        let mut reader = NsReader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut message = SoapMessage::default();
        let mut depth = 0usize;
        let mut seen_envelope = false;
        let mut seen_body = false;

        loop {
            let (ns, event) = reader.read_resolved_event().map_err(SoapError::xml)?;
            let namespace = match ns {
                ResolveResult::Bound(n) => Some(String::from_utf8_lossy(n.as_ref()).into_owned()),
                _ => None,
            };

            match event {
                Event::Start(start) => {
                    let local = local_name(&start);
                    match depth {
                        0 => {
                            expect_envelope(namespace.as_deref(), &local)?;
                            seen_envelope = true;
                        }
                        1 => match (is_envelope_ns(namespace.as_deref()), local.as_str()) {
                            (true, "Header") => {
                                message.header = Some(capture(&mut reader, start)?);
                                continue;
                            }
                            (true, "Body") => seen_body = true,
                            _ => {
                                return Err(SoapError::MalformedEnvelope(format!(
                                    "unexpected element '{}' in Envelope",
                                    local
                                )))
                            }
                        },
                        2 => {
                            if is_envelope_ns(namespace.as_deref()) && local == "Fault" {
                                message.fault = Some(parse_fault(&mut reader)?);
                            } else if message.payload.is_none() {
                                message.payload_name =
                                    Some(QualifiedName::new(namespace.unwrap_or_default(), local));
                                message.payload = Some(capture(&mut reader, start)?);
                            } else {
                                capture(&mut reader, start)?;
                            }
                            continue;
                        }
                        _ => {}
                    }
                    depth += 1;
                }
                Event::Empty(start) => {
                    let local = local_name(&start);
                    match depth {
                        0 => {
                            return Err(SoapError::MalformedEnvelope("empty Envelope".into()));
                        }
                        1 if local == "Body" => seen_body = true,
                        2 if is_envelope_ns(namespace.as_deref()) && local == "Fault" => {
                            message.fault = Some(SoapFault::default());
                        }
                        2 if message.payload.is_none() => {
                            message.payload_name =
                                Some(QualifiedName::new(namespace.unwrap_or_default(), local));
                            message.payload = Some(write_single(Event::Empty(start))?);
                        }
                        _ => {}
                    }
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_envelope {
            return Err(SoapError::MalformedEnvelope("missing Envelope".into()));
        }
        if !seen_body {
            return Err(SoapError::MalformedEnvelope("missing Body".into()));
        }
        Ok(message)
    }
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn is_envelope_ns(namespace: Option<&str>) -> bool {
    matches!(namespace, Some(SOAP_ENV_NS) | Some(SOAP12_ENV_NS))
}

fn expect_envelope(namespace: Option<&str>, local: &str) -> Result<(), SoapError> {
    if local != "Envelope" {
        return Err(SoapError::MalformedEnvelope(format!(
            "root element is '{}', expected Envelope",
            local
        )));
    }
    if !is_envelope_ns(namespace) {
        return Err(SoapError::MalformedEnvelope(format!(
            "unsupported envelope namespace '{}'",
            namespace.unwrap_or("")
        )));
    }
    Ok(())
}

fn write_single(event: Event<'_>) -> Result<String, SoapError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(event).map_err(SoapError::xml)?;
    String::from_utf8(writer.into_inner()).map_err(SoapError::xml)
}

/// Copy the element opened by `start` (through its end tag) into a string.
fn capture<'i>(reader: &mut NsReader<&'i [u8]>, start: BytesStart<'i>) -> Result<String, SoapError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Start(start)).map_err(SoapError::xml)?;

    let mut depth = 1usize;
    while depth > 0 {
        let event = reader.read_event().map_err(SoapError::xml)?;
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => {
                return Err(SoapError::MalformedEnvelope("unexpected end of document".into()))
            }
            _ => {}
        }
        writer.write_event(event).map_err(SoapError::xml)?;
    }

    String::from_utf8(writer.into_inner()).map_err(SoapError::xml)
}

fn parse_fault<'i>(reader: &mut NsReader<&'i [u8]>) -> Result<SoapFault, SoapError> {
    let mut fault = SoapFault::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event().map_err(SoapError::xml)? {
            Event::Start(start) => {
                let local = local_name(&start);
                if path.is_empty() && local.eq_ignore_ascii_case("detail") {
                    fault.detail = Some(capture(reader, start)?);
                    continue;
                }
                path.push(local);
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(SoapError::xml)?.into_owned();
                match path.last().map(String::as_str) {
                    Some("faultcode") | Some("Value") if fault.code.is_empty() => fault.code = value,
                    Some("faultstring") | Some("Text") if fault.reason.is_empty() => {
                        fault.reason = value
                    }
                    _ => {}
                }
            }
            Event::End(_) => {
                if path.pop().is_none() {
                    return Ok(fault);
                }
            }
            Event::Eof => return Err(SoapError::MalformedEnvelope("unterminated Fault".into())),
            _ => {}
        }
    }
}
