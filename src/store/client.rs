use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::model::{parse_document, to_xml, Element, Plural};
use crate::schema::{ObjectType, SchemaVariant};
use crate::store::options::ReturnElements;
use crate::store::soap::{self, Operation};
use crate::store::transport::{HttpTransport, Transport};

/// Message used when the store cannot explain its own error code
const UNKNOWN_ERROR_MESSAGE: &str = "Could not parse error code";

/// A `field = value` selector for one query object
pub type Selector<'a> = [(&'a str, &'a str)];

/// Client for the WMLS 1.4 store interface.
///
/// Requests are wrapped in the plural envelope of their object type and
/// replies are parsed with the client's schema variant.
pub struct StoreClient<T = HttpTransport> {
    transport: T,
    variant: SchemaVariant,
}

impl StoreClient<HttpTransport> {
    /// Connect over HTTP(S) using `config`
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        StoreClient::with_transport(transport, config.variant)
    }
}

impl<T: Transport> StoreClient<T> {
    pub fn with_transport(transport: T, variant: SchemaVariant) -> Result<Self> {
        if !variant.is_store_compatible() {
            return Err(Error::UnqueryableType(format!(
                "schema variant {} is not served by the store interface",
                variant
            )));
        }
        Ok(StoreClient { transport, variant })
    }

    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call(&self, operation: Operation, params: &[(&str, &str)]) -> Result<String> {
        let envelope = soap::build_request(operation, params)?;
        self.transport.post(&operation.soap_action(), envelope)
    }

    /// Run a data operation and parse its `XMLout`, if any
    fn store_call(&self, operation: Operation, params: &[(&str, &str)]) -> Result<Option<Element>> {
        let reply = soap::parse_store_reply(operation, &self.call(operation, params)?)?;

        if reply.result <= 0 {
            let message = self.base_message(reply.result).unwrap_or_else(|err| {
                log::warn!("lookup of store error code {} failed: {}", reply.result, err);
                UNKNOWN_ERROR_MESSAGE.to_string()
            });
            return Err(Error::Store {
                code: reply.result,
                message,
                supplemental: reply.supp_msg_out,
            });
        }

        if !reply.supp_msg_out.is_empty() {
            log::info!("{}: {}", operation.name(), reply.supp_msg_out);
        }

        reply
            .xml_out
            .map(|xml| parse_document(&xml, self.variant))
            .transpose()
    }

    /// Human readable message for a store result code
    pub fn base_message(&self, code: i32) -> Result<String> {
        let code = code.to_string();
        let reply = self.call(Operation::GetBaseMsg, &[("ReturnValueIn", code.as_str())])?;
        soap::parse_base_msg_reply(&reply)
    }

    /// Wrap objects of one type in their plural envelope.
    ///
    /// The envelope carries the variant namespace and version, e.g.
    /// `<logs xmlns="http://www.witsml.org/schemas/1series" version="1.4.1.1">`.
    pub fn envelope(&self, objects: &[Element]) -> Result<(ObjectType, Element)> {
        let first = objects
            .first()
            .ok_or_else(|| Error::UnqueryableType("empty object list".to_string()))?;
        let object_type: ObjectType = first.name().parse()?;

        if let Some(other) = objects.iter().find(|o| o.name() != first.name()) {
            return Err(Error::MixedObjectTypes {
                first: first.name().to_string(),
                other: other.name().to_string(),
            });
        }

        Ok((object_type, self.typed_envelope(object_type, objects.to_vec())))
    }

    /// Plural envelope of `object_type` around `objects`, which may be empty
    pub fn typed_envelope(&self, object_type: ObjectType, objects: Vec<Element>) -> Element {
        Element::new(object_type.plural_name())
            .with_attribute("xmlns", self.variant.namespace())
            .with_attribute("version", self.variant.version())
            .with_plural(object_type.name(), objects)
    }

    fn get_envelope(
        &self,
        objects: &[Element],
        return_elements: ReturnElements,
    ) -> Result<(ObjectType, Element)> {
        let (object_type, envelope) = self.envelope(objects)?;
        let query = to_xml(&envelope)?;
        let options = return_elements.options_in();

        log::debug!("GetFromStore {} ({} objects, {})", object_type, objects.len(), options);
        let reply = self
            .store_call(
                Operation::GetFromStore,
                &[
                    ("WMLtypeIn", object_type.name()),
                    ("QueryIn", query.as_str()),
                    ("OptionsIn", options.as_str()),
                    ("CapabilitiesIn", ""),
                ],
            )?
            .ok_or_else(|| Error::Soap("GetFromStore reply carries no XMLout".to_string()))?;
        Ok((object_type, reply))
    }

    /// Query the store with complete query objects of one type
    pub fn get_objects(&self, objects: &[Element], return_elements: ReturnElements) -> Result<Plural> {
        let (object_type, reply) = self.get_envelope(objects, return_elements)?;
        let found = reply.elements(object_type.name()).to_vec();
        log::debug!("store returned {} {} objects", found.len(), object_type);
        Ok(Plural::new(object_type.name(), found))
    }

    /// Query with one selector per query object
    pub fn get(
        &self,
        object_type: ObjectType,
        selectors: &[&Selector<'_>],
        return_elements: ReturnElements,
    ) -> Result<Plural> {
        if selectors.is_empty() {
            return Err(Error::MalformedSelector {
                object_type: object_type.name().to_string(),
                field: "selector list is empty".to_string(),
            });
        }

        let objects = selectors
            .iter()
            .map(|selector| object_type.query_object(selector.iter().copied()))
            .collect::<Result<Vec<_>>>()?;
        self.get_objects(&objects, return_elements)
    }

    /// Query with a single selector; usually called with `IdOnly`
    pub fn list(
        &self,
        object_type: ObjectType,
        selector: &Selector<'_>,
        return_elements: ReturnElements,
    ) -> Result<Plural> {
        self.get(object_type, &[selector], return_elements)
    }

    pub fn add_objects(&self, objects: &[Element]) -> Result<()> {
        self.write_objects(Operation::AddToStore, objects)
    }

    pub fn update_objects(&self, objects: &[Element]) -> Result<()> {
        self.write_objects(Operation::UpdateInStore, objects)
    }

    fn write_objects(&self, operation: Operation, objects: &[Element]) -> Result<()> {
        let (object_type, envelope) = self.envelope(objects)?;
        if self.variant == SchemaVariant::V1411Write {
            for object in objects {
                check_identifiers(object_type, object)?;
            }
        }

        let xml = to_xml(&envelope)?;
        log::debug!("{} {} ({} objects)", operation.name(), object_type, objects.len());
        self.store_call(
            operation,
            &[
                ("WMLtypeIn", object_type.name()),
                ("XMLin", xml.as_str()),
                ("OptionsIn", ""),
                ("CapabilitiesIn", ""),
            ],
        )?;
        Ok(())
    }

    /// Delete the objects matching one selector
    pub fn delete(&self, object_type: ObjectType, selector: &Selector<'_>) -> Result<()> {
        let object = object_type.query_object(selector.iter().copied())?;
        self.delete_objects(&[object])
    }

    pub fn delete_objects(&self, objects: &[Element]) -> Result<()> {
        let (object_type, envelope) = self.envelope(objects)?;
        let query = to_xml(&envelope)?;
        log::debug!("DeleteFromStore {} ({} objects)", object_type, objects.len());
        self.store_call(
            Operation::DeleteFromStore,
            &[
                ("WMLtypeIn", object_type.name()),
                ("QueryIn", query.as_str()),
                ("OptionsIn", ""),
                ("CapabilitiesIn", ""),
            ],
        )?;
        Ok(())
    }

    fn get_typed(
        &self,
        expected: ObjectType,
        query: &Element,
        return_elements: ReturnElements,
    ) -> Result<Element> {
        if query.name() != expected.name() {
            return Err(Error::UnqueryableType(format!(
                "'{}' query passed where a {} query is required",
                query.name(),
                expected
            )));
        }
        let (_, reply) = self.get_envelope(std::slice::from_ref(query), return_elements)?;
        Ok(reply)
    }

    /// Returns the whole `logs` envelope of the reply
    pub fn get_logs(&self, query: &Element, return_elements: ReturnElements) -> Result<Element> {
        self.get_typed(ObjectType::Log, query, return_elements)
    }

    pub fn get_bha_runs(&self, query: &Element, return_elements: ReturnElements) -> Result<Element> {
        self.get_typed(ObjectType::BhaRun, query, return_elements)
    }

    pub fn get_mud_logs(&self, query: &Element, return_elements: ReturnElements) -> Result<Element> {
        self.get_typed(ObjectType::MudLog, query, return_elements)
    }

    pub fn get_trajectorys(&self, query: &Element, return_elements: ReturnElements) -> Result<Element> {
        self.get_typed(ObjectType::Trajectory, query, return_elements)
    }

    pub fn get_wellbores(&self, query: &Element, return_elements: ReturnElements) -> Result<Element> {
        self.get_typed(ObjectType::Wellbore, query, return_elements)
    }
}

/// Objects written to a store must carry every identifier of their type
fn check_identifiers(object_type: ObjectType, object: &Element) -> Result<()> {
    for attr in object_type.id_attributes() {
        let present = object
            .attribute(attr)
            .map(|v| !v.to_string().is_empty())
            .unwrap_or(false);
        if !present {
            return Err(Error::Validation(format!(
                "{} is missing required attribute '{}'",
                object_type, attr
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Canned {
        replies: RefCell<VecDeque<String>>,
        requests: RefCell<Vec<(String, String)>>,
    }

    impl Canned {
        fn with(replies: Vec<String>) -> Self {
            Canned {
                replies: RefCell::new(replies.into()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn post(&self, soap_action: &str, envelope: String) -> Result<String> {
            self.requests
                .borrow_mut()
                .push((soap_action.to_string(), envelope));
            self.replies
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| Error::Soap("no canned reply".to_string()))
        }
    }

    fn reply(operation: &str, result: i32, xml_out: &str, supp: &str) -> String {
        format!(
            "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\"><soap:Body>\
             <{op}Response><Result>{result}</Result><XMLout>{xml}</XMLout><SuppMsgOut>{supp}</SuppMsgOut>\
             </{op}Response></soap:Body></soap:Envelope>",
            op = operation,
            result = result,
            xml = quick_xml::escape::escape(xml_out),
            supp = supp,
        )
    }

    #[test]
    fn test_list_wellbores() {
        let transport = Canned::with(vec![reply(
            "WMLS_GetFromStore",
            1,
            r#"<wellbores version="1.4.1.1"><wellbore uid="B-1" uidWell="W-1"/><wellbore uid="B-2" uidWell="W-1"/></wellbores>"#,
            "",
        )]);
        let client = StoreClient::with_transport(&transport, SchemaVariant::V1411Read).unwrap();

        let found = client
            .list(ObjectType::Wellbore, &[("uidWell", "W-1")], ReturnElements::IdOnly)
            .unwrap();
        assert_eq!(found.name(), "wellbore");
        assert_eq!(found.len(), 2);

        let requests = transport.requests.borrow();
        assert_eq!(
            requests[0].0,
            "http://www.witsml.org/action/120/Store.WMLS_GetFromStore"
        );
        assert!(requests[0].1.contains("<WMLtypeIn>wellbore</WMLtypeIn>"));
        assert!(requests[0].1.contains("returnElements=id-only"));
        assert!(requests[0].1.contains("&lt;wellbores"));
    }

    #[test]
    fn test_error_code_is_looked_up() {
        let transport = Canned::with(vec![
            reply("WMLS_AddToStore", -405, "", "uid exists"),
            "<Envelope><Body><WMLS_GetBaseMsgResponse><Result>Data object uid already exists.</Result>\
             </WMLS_GetBaseMsgResponse></Body></Envelope>"
                .to_string(),
        ]);
        let client = StoreClient::with_transport(&transport, SchemaVariant::V1411Read).unwrap();

        let err = client
            .add_objects(&[Element::new("well").with_attribute("uid", "W-1")])
            .unwrap_err();
        assert_eq!(err.to_string(), "-405 : Data object uid already exists. - uid exists");
        assert!(transport.requests.borrow()[1].1.contains("<ReturnValueIn>-405</ReturnValueIn>"));
    }

    #[test]
    fn test_unknown_error_code() {
        let transport = Canned::with(vec![reply("WMLS_DeleteFromStore", -999, "", "")]);
        let client = StoreClient::with_transport(&transport, SchemaVariant::V1411Read).unwrap();

        match client.delete(ObjectType::Well, &[("uid", "W-1")]) {
            Err(Error::Store { code, message, .. }) => {
                assert_eq!(code, -999);
                assert_eq!(message, "Could not parse error code");
            }
            other => panic!("expected store error, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope_rejects_mixed_types() {
        let transport = Canned::default();
        let client = StoreClient::with_transport(&transport, SchemaVariant::V1411Read).unwrap();

        let objects = vec![Element::new("log"), Element::new("trajectory")];
        assert!(matches!(
            client.get_objects(&objects, ReturnElements::All),
            Err(Error::MixedObjectTypes { .. })
        ));
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn test_envelope_namespace_and_version() {
        let client = StoreClient::with_transport(Canned::default(), SchemaVariant::V1411Read).unwrap();
        let (object_type, envelope) = client.envelope(&[Element::new("trajectory")]).unwrap();
        assert_eq!(object_type, ObjectType::Trajectory);
        assert_eq!(
            to_xml(&envelope).unwrap(),
            r#"<trajectorys xmlns="http://www.witsml.org/schemas/1series" version="1.4.1.1"><trajectory/></trajectorys>"#
        );
    }

    #[test]
    fn test_typed_envelope_of_reply() {
        let client = StoreClient::with_transport(Canned::default(), SchemaVariant::V1411Read).unwrap();

        let empty = client.typed_envelope(ObjectType::Log, Vec::new());
        assert_eq!(
            to_xml(&empty).unwrap(),
            r#"<logs xmlns="http://www.witsml.org/schemas/1series" version="1.4.1.1"></logs>"#
        );

        let well = Element::new("well").with_attribute("uid", "W-1");
        let wells = client.typed_envelope(ObjectType::Well, vec![well]);
        assert_eq!(
            to_xml(&wells).unwrap(),
            r#"<wells xmlns="http://www.witsml.org/schemas/1series" version="1.4.1.1"><well uid="W-1"/></wells>"#
        );
    }

    #[test]
    fn test_v20_is_rejected() {
        assert!(matches!(
            StoreClient::with_transport(Canned::default(), SchemaVariant::V20),
            Err(Error::UnqueryableType(_))
        ));
    }

    #[test]
    fn test_write_variant_checks_identifiers() {
        let transport = Canned::default();
        let client = StoreClient::with_transport(&transport, SchemaVariant::V1411Write).unwrap();

        let err = client
            .update_objects(&[Element::new("wellbore").with_attribute("uid", "B-1")])
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("uidWell")));
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn test_empty_selectors() {
        let client = StoreClient::with_transport(Canned::default(), SchemaVariant::V1411Read).unwrap();
        assert!(matches!(
            client.get(ObjectType::Log, &[], ReturnElements::All),
            Err(Error::MalformedSelector { .. })
        ));
    }

    #[test]
    fn test_typed_shortcut_checks_query_type() {
        let client = StoreClient::with_transport(Canned::default(), SchemaVariant::V1411Read).unwrap();
        assert!(matches!(
            client.get_logs(&Element::new("trajectory"), ReturnElements::All),
            Err(Error::UnqueryableType(_))
        ));
    }
}
