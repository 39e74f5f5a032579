use serde_json::Value;

#[test]
fn openapi_documents_crm_resources() -> anyhow::Result<()> {
    let doc = crm_backend::docs::build_openapi(8000)?;
    let v = serde_json::to_value(&doc)?;

    let paths = v.get("paths").and_then(Value::as_object).expect("paths must exist");
    for path in ["/client", "/client/{id}", "/contract", "/contract_status/{id}", "/event/{id}", "/auth/login"] {
        assert!(paths.contains_key(path), "OpenAPI missing path '{}'", path);
    }

    let event_props = v
        .pointer("/components/schemas/Event/properties")
        .and_then(Value::as_object)
        .expect("components.schemas.Event.properties must exist");
    for k in ["contract", "support_contact", "attendees", "date"] {
        assert!(event_props.contains_key(k), "OpenAPI Event schema missing '{}'", k);
    }

    assert!(v.pointer("/components/securitySchemes/bearerAuth").is_some());

    Ok(())
}
