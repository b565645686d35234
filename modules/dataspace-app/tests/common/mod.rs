//! Activity builders shared by the dispatcher tests.
#![allow(dead_code)]

use serde_json::{json, Value};

use dataspace_common::Activity;

pub const ALICE: &str = "did:example:alice";

pub fn consignment(global_id: &str) -> Value {
    json!({
        "@context": "https://vocabulary.uncefact.org/",
        "type": "Consignment",
        "globalId": global_id,
        "consignorParty": ALICE,
        "exportTypeCode": "09011101",
        "destinationCountry": { "countryId": "#GB" }
    })
}

pub fn consignment_ref(global_id: &str) -> Value {
    json!({
        "@context": "https://vocabulary.uncefact.org/",
        "type": "Consignment",
        "globalId": global_id
    })
}

pub fn document(type_code: &str) -> Value {
    json!({
        "@context": "https://vocabulary.uncefact.org/",
        "type": "Document",
        "documentTypeCode": type_code,
        "name": "Phytosanitary certificate"
    })
}

pub fn document_with_id(type_code: &str, global_id: &str) -> Value {
    let mut doc = document(type_code);
    doc["globalId"] = json!(global_id);
    doc
}

pub fn event(status: &str) -> Value {
    json!({
        "@context": "https://vocabulary.uncefact.org/",
        "type": "Event",
        "timestamp": "2024-05-01T10:00:00Z",
        "location": "Port of Santos",
        "status": status
    })
}

pub fn create(object: Value) -> Activity {
    Activity::new("Create", ALICE, object)
}

pub fn add(object: Value, target: Value) -> Activity {
    Activity::new("Add", ALICE, object).with_target(target)
}
