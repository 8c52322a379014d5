//! SOAP 1.1 envelopes for the WMLS store interface

use crate::error::{Error, Result};
use crate::model::{parse_document, to_xml, Element};
use crate::schema::SchemaVariant;

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const WMLS_MESSAGE_NS: &str = "http://www.witsml.org/message/120";
const WMLS_ACTION_PREFIX: &str = "http://www.witsml.org/action/120/Store.";

/// A remote store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetFromStore,
    AddToStore,
    UpdateInStore,
    DeleteFromStore,
    GetBaseMsg,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::GetFromStore => "WMLS_GetFromStore",
            Operation::AddToStore => "WMLS_AddToStore",
            Operation::UpdateInStore => "WMLS_UpdateInStore",
            Operation::DeleteFromStore => "WMLS_DeleteFromStore",
            Operation::GetBaseMsg => "WMLS_GetBaseMsg",
        }
    }

    pub fn soap_action(self) -> String {
        format!("{}{}", WMLS_ACTION_PREFIX, self.name())
    }

    fn response_name(self) -> String {
        format!("{}Response", self.name())
    }
}

/// Build the request envelope for `operation` with its parameters in order
pub fn build_request(operation: Operation, params: &[(&str, &str)]) -> Result<String> {
    let call = params.iter().fold(
        Element::new(format!("wmls:{}", operation.name())),
        |call, (name, value)| call.with_text(*name, *value),
    );

    let envelope = Element::new("soap:Envelope")
        .with_attribute("xmlns:soap", SOAP_ENVELOPE_NS)
        .with_attribute("xmlns:wmls", WMLS_MESSAGE_NS)
        .with_child(Element::new("soap:Body").with_child(call));

    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>{}",
        to_xml(&envelope)?
    ))
}

/// Reply of the four data operations
#[derive(Debug, Clone, PartialEq)]
pub struct StoreReply {
    pub result: i32,
    pub xml_out: Option<String>,
    pub supp_msg_out: String,
}

/// Unwrap the response element of `operation`, surfacing SOAP faults
fn response_element(operation: Operation, xml: &str) -> Result<Element> {
    let envelope = parse_document(xml, SchemaVariant::V1411Read)?;
    let body = envelope
        .element("Body")
        .ok_or_else(|| Error::Soap("reply has no Body".to_string()))?;

    if let Some(fault) = body.element("Fault") {
        let reason = fault
            .text("faultstring")
            .unwrap_or_else(|| "unspecified fault".to_string());
        return Err(Error::Soap(reason));
    }

    let expected = operation.response_name();
    body.element(&expected)
        .cloned()
        .ok_or_else(|| Error::Soap(format!("reply has no {}", expected)))
}

pub fn parse_store_reply(operation: Operation, xml: &str) -> Result<StoreReply> {
    let response = response_element(operation, xml)?;

    let result = response
        .text("Result")
        .ok_or_else(|| Error::Soap("reply has no Result".to_string()))?;
    let result = result
        .trim()
        .parse::<i32>()
        .map_err(|_| Error::Soap(format!("Result is not an integer: '{}'", result)))?;

    Ok(StoreReply {
        result,
        xml_out: response.text("XMLout").filter(|x| !x.trim().is_empty()),
        supp_msg_out: response.text("SuppMsgOut").unwrap_or_default(),
    })
}

pub fn parse_base_msg_reply(xml: &str) -> Result<String> {
    let response = response_element(Operation::GetBaseMsg, xml)?;
    response
        .text("Result")
        .ok_or_else(|| Error::Soap("reply has no Result".to_string()))
}
