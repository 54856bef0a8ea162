//! Qualified envelopes: payloads paired with their root-element identity.
//!
//! Payload types carry no XML root name of their own. Before dispatch a payload
//! is wrapped with the qualified name the endpoint expects; after dispatch the
//! response element is checked against its expected name and unwrapped.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use quick_xml::{Reader, Writer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::soap::message::SoapMessage;
use crate::soap::types::{GatewayError, QualifiedName, SoapError};

/// Prefix bound to the payload namespace on marshalled root elements.
const PAYLOAD_PREFIX: &str = "tns";

const XSI_NS: &[u8] = b"http://www.w3.org/2001/XMLSchema-instance";

/// The envelope, or the value inside it, is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("envelope carries no value")]
pub struct MissingValue;

/// A payload together with its namespace-qualified element name.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedEnvelope<T> {
    name: QualifiedName,
    declared_type: &'static str,
    value: Option<T>,
}

impl<T> QualifiedEnvelope<T> {
    pub fn new(name: QualifiedName, value: Option<T>) -> Self {
        Self {
            name,
            declared_type: short_type_name::<T>(),
            value,
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn declared_type(&self) -> &'static str {
        self.declared_type
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Attach root-element identity to a payload.
pub fn wrap<T>(payload: T, name: QualifiedName) -> QualifiedEnvelope<T> {
    QualifiedEnvelope::new(name, Some(payload))
}

/// Take the payload out of an envelope.
pub fn unwrap<T>(envelope: Option<QualifiedEnvelope<T>>) -> Result<T, MissingValue> {
    envelope.and_then(|e| e.value).ok_or(MissingValue)
}

/// Serialize the envelope's payload into a SOAP request message.
pub fn marshal<T: Serialize>(envelope: &QualifiedEnvelope<T>) -> Result<SoapMessage, GatewayError> {
    let value = envelope.value().ok_or_else(|| {
        GatewayError::Marshal(format!("{} envelope has no value", envelope.declared_type()))
    })?;

    let bare = quick_xml::se::to_string_with_root(&envelope.name().local_name, value)
        .map_err(|e| GatewayError::Marshal(e.to_string()))?;
    let qualified = qualify_root(&bare, envelope.name())?;

    Ok(SoapMessage::with_payload(qualified, envelope.name().clone()))
}

/// Read the expected response element out of a SOAP message.
///
/// An empty body yields `Ok(None)`; a body element with a different qualified
/// name is an unmarshal error.
pub fn unmarshal<T: DeserializeOwned>(
    message: &SoapMessage,
    expected: &QualifiedName,
) -> Result<Option<QualifiedEnvelope<T>>, GatewayError> {
    let (Some(payload), Some(name)) = (message.payload_source(), message.payload_name()) else {
        return Ok(None);
    };

    if name != expected {
        return Err(GatewayError::Unmarshal(format!(
            "unexpected element {}, expected {}",
            name, expected
        )));
    }

    let bare = strip_prefixes(payload)?;
    let value: T =
        quick_xml::de::from_str(&bare).map_err(|e| GatewayError::Unmarshal(e.to_string()))?;

    Ok(Some(QualifiedEnvelope::new(expected.clone(), Some(value))))
}

/// Rename the root element to `tns:<local>` and declare `tns`.
fn qualify_root(xml: &str, name: &QualifiedName) -> Result<String, SoapError> {
    let qualified = format!("{}:{}", PAYLOAD_PREFIX, name.local_name);
    let binding = format!("xmlns:{}", PAYLOAD_PREFIX);

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;

    loop {
        let event = match reader.read_event().map_err(SoapError::xml)? {
            Event::Eof => break,
            Event::Start(start) if depth == 0 => {
                depth += 1;
                Event::Start(rename_root(&start, &qualified, &binding, &name.namespace)?)
            }
            Event::Empty(start) if depth == 0 => {
                Event::Empty(rename_root(&start, &qualified, &binding, &name.namespace)?)
            }
            Event::Start(start) => {
                depth += 1;
                Event::Start(start)
            }
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    Event::End(BytesEnd::new(qualified.clone()))
                } else {
                    Event::End(end)
                }
            }
            other => other,
        };
        writer.write_event(event).map_err(SoapError::xml)?;
    }

    String::from_utf8(writer.into_inner()).map_err(SoapError::xml)
}

fn rename_root(
    start: &BytesStart<'_>,
    qualified: &str,
    binding: &str,
    namespace: &str,
) -> Result<BytesStart<'static>, SoapError> {
    let mut root = BytesStart::new(qualified.to_string());
    root.push_attribute((binding, namespace));
    for attr in start.attributes() {
        let attr = attr.map_err(SoapError::xml)?;
        root.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
    }
    Ok(root)
}

/// Drop namespace prefixes and declarations so fields bind by local name.
///
/// Elements marked `xsi:nil` are dropped entirely so that they bind as absent
/// rather than as empty text.
fn strip_prefixes(xml: &str) -> Result<String, SoapError> {
    let mut reader = NsReader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut nil_depth = 0usize;

    loop {
        let event = reader.read_event().map_err(SoapError::xml)?;
        if nil_depth > 0 {
            match event {
                Event::Start(_) => nil_depth += 1,
                Event::End(_) => nil_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        let event = match event {
            Event::Eof => break,
            Event::Start(start) => {
                if is_nil(&reader, &start)? {
                    nil_depth = 1;
                    continue;
                }
                Event::Start(unqualified(&start)?)
            }
            Event::Empty(start) => {
                if is_nil(&reader, &start)? {
                    continue;
                }
                Event::Empty(unqualified(&start)?)
            }
            Event::End(end) => Event::End(BytesEnd::new(
                String::from_utf8_lossy(end.local_name().as_ref()).into_owned(),
            )),
            other => other,
        };
        writer.write_event(event).map_err(SoapError::xml)?;
    }

    String::from_utf8(writer.into_inner()).map_err(SoapError::xml)
}

fn unqualified(start: &BytesStart<'_>) -> Result<BytesStart<'static>, SoapError> {
    let mut out = BytesStart::new(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(SoapError::xml)?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        out.push_attribute((attr.key.local_name().as_ref(), attr.value.as_ref()));
    }
    Ok(out)
}

/// Whether the element carries `xsi:nil="true"`.
///
/// A payload captured out of its envelope may have lost the `xsi` declaration,
/// so an undeclared `xsi` prefix is accepted too.
fn is_nil(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<bool, SoapError> {
    for attr in start.attributes() {
        let attr = attr.map_err(SoapError::xml)?;
        if attr.key.local_name().as_ref() != b"nil" {
            continue;
        }
        let schema_instance = match reader.resolve_attribute(attr.key).0 {
            ResolveResult::Bound(ns) => ns.as_ref() == XSI_NS,
            ResolveResult::Unknown(prefix) => prefix == b"xsi",
            ResolveResult::Unbound => false,
        };
        if schema_instance {
            return Ok(matches!(attr.value.as_ref(), b"true" | b"1"));
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    struct Lookup {
        #[serde(skip_serializing_if = "Option::is_none")]
        customer_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        service_type: Option<String>,
    }

    fn request_name() -> QualifiedName {
        QualifiedName::new("http://cbcm.pull.cis.sem/", "getSubscriptionDtls")
    }

    fn lookup() -> Lookup {
        Lookup {
            customer_id: Some("CUST12345".into()),
            service_type: Some("MOBILE".into()),
        }
    }

    #[test]
    fn wrap_then_unwrap_is_identity() {
        let envelope = wrap(lookup(), request_name());
        assert_eq!(envelope.name(), &request_name());
        assert_eq!(envelope.declared_type(), "Lookup");
        assert_eq!(unwrap(Some(envelope)), Ok(lookup()));
    }

    #[test]
    fn unwrap_absent_value_is_missing() {
        assert_eq!(unwrap::<Lookup>(None), Err(MissingValue));
        assert_eq!(
            unwrap(Some(QualifiedEnvelope::<Lookup>::new(request_name(), None))),
            Err(MissingValue)
        );
    }

    #[test]
    fn marshal_qualifies_root_element() {
        let message = marshal(&wrap(lookup(), request_name())).unwrap();
        assert_eq!(
            message.payload_source(),
            Some(
                r#"<tns:getSubscriptionDtls xmlns:tns="http://cbcm.pull.cis.sem/"><customerId>CUST12345</customerId><serviceType>MOBILE</serviceType></tns:getSubscriptionDtls>"#
            )
        );
        assert_eq!(message.payload_name(), Some(&request_name()));
    }

    #[test]
    fn marshal_empty_payload() {
        let message = marshal(&wrap(Lookup::default(), request_name())).unwrap();
        let payload = message.payload_source().unwrap();
        assert!(payload.starts_with(r#"<tns:getSubscriptionDtls xmlns:tns="http://cbcm.pull.cis.sem/""#));
        assert!(!payload.contains("customerId"));
    }

    #[test]
    fn marshal_without_value_fails() {
        let err = marshal(&QualifiedEnvelope::<Lookup>::new(request_name(), None)).unwrap_err();
        assert!(matches!(err, GatewayError::Marshal(_)));
    }

    #[test]
    fn marshalled_request_unmarshals_back() {
        let message = marshal(&wrap(lookup(), request_name())).unwrap();
        let reparsed = SoapMessage::parse(message.to_xml().as_bytes()).unwrap();
        let envelope = unmarshal::<Lookup>(&reparsed, &request_name()).unwrap();
        assert_eq!(unwrap(envelope), Ok(lookup()));
    }

    #[test]
    fn unmarshal_empty_body_is_none() {
        let message = SoapMessage::default();
        assert!(unmarshal::<Lookup>(&message, &request_name()).unwrap().is_none());
    }

    #[test]
    fn unmarshal_rejects_other_element() {
        let message = SoapMessage::with_payload(
            "<x:other xmlns:x=\"urn:x\"/>",
            QualifiedName::new("urn:x", "other"),
        );
        let err = unmarshal::<Lookup>(&message, &request_name()).unwrap_err();
        assert!(err.to_string().contains("unexpected element {urn:x}other"));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Outcome {
        status: Option<String>,
        message: Option<String>,
    }

    fn outcome_name() -> QualifiedName {
        QualifiedName::new("http://cbcm.pull.cis.sem/", "getSubscriptionDtlsResponse")
    }

    #[test]
    fn nil_elements_unmarshal_as_absent() {
        let message = SoapMessage::with_payload(
            r#"<n:getSubscriptionDtlsResponse xmlns:n="http://cbcm.pull.cis.sem/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><status xsi:nil="true"/><message>a &amp; b</message></n:getSubscriptionDtlsResponse>"#,
            outcome_name(),
        );
        let outcome = unwrap(unmarshal::<Outcome>(&message, &outcome_name()).unwrap()).unwrap();
        assert_eq!(
            outcome,
            Outcome {
                status: None,
                message: Some("a & b".into()),
            }
        );
    }

    #[test]
    fn nil_span_with_undeclared_prefix_is_dropped() {
        let message = SoapMessage::with_payload(
            r#"<n:getSubscriptionDtlsResponse xmlns:n="http://cbcm.pull.cis.sem/"><status>OK</status><message xsi:nil="1"></message></n:getSubscriptionDtlsResponse>"#,
            outcome_name(),
        );
        let outcome = unwrap(unmarshal::<Outcome>(&message, &outcome_name()).unwrap()).unwrap();
        assert_eq!(outcome.status.as_deref(), Some("OK"));
        assert!(outcome.message.is_none());
    }

    #[test]
    fn nil_false_keeps_element() {
        let stripped = strip_prefixes(
            r#"<r xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><status xsi:nil="false">OK</status></r>"#,
        )
        .unwrap();
        assert_eq!(stripped, r#"<r><status nil="false">OK</status></r>"#);
    }

    #[test]
    fn strip_prefixes_drops_declarations() {
        let stripped = strip_prefixes(
            r#"<ns2:resp xmlns:ns2="urn:cis" ns2:version="2"><ns2:status>OK</ns2:status></ns2:resp>"#,
        )
        .unwrap();
        assert_eq!(stripped, r#"<resp version="2"><status>OK</status></resp>"#);
    }
}
