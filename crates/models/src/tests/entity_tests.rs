use sea_orm::{ActiveValue, IntoActiveModel};
use serde_json::json;

use crate::{category, item, product, Record, Submission};

#[test]
fn payload_leaves_id_and_version_to_the_store() {
    let payload = category::Payload {
        id: Some(42),
        version: Some(7),
        name: "Fish".into(),
        description: None,
    };
    let am: category::ActiveModel = payload.into_active_model();
    assert!(matches!(am.id, ActiveValue::NotSet));
    assert!(matches!(am.version, ActiveValue::NotSet));
    assert!(matches!(&am.name, ActiveValue::Set(n) if n == "Fish"));
    assert!(matches!(am.description, ActiveValue::Set(None)));
}

#[test]
fn payload_accepts_missing_identity() {
    let payload: product::Payload = serde_json::from_value(json!({"name": "Angelfish"})).unwrap();
    assert_eq!(Submission::id(&payload), None);
    assert_eq!(Submission::version(&payload), None);
    assert_eq!(payload.category_id, None);
}

#[test]
fn category_model_omits_absent_description() {
    let m = category::Model { id: 1, version: 1, name: "Fish".into(), description: None };
    assert_eq!(serde_json::to_value(&m).unwrap(), json!({"id": 1, "version": 1, "name": "Fish"}));
}

#[test]
fn item_view_embeds_product() {
    let it = item::Model {
        id: 3,
        version: 2,
        name: "Large Angelfish".into(),
        description: None,
        image_path: Some("fish1.jpg".into()),
        unit_cost: 10.0,
        product_id: Some(5),
    };
    let p = product::Model { id: 5, version: 1, name: "Angelfish".into(), description: None, category_id: None };
    let view = item::View::from_parts(it, Some(p));
    assert_eq!(view.id(), 3);
    assert_eq!(view.version(), 2);
    let body = serde_json::to_value(&view).unwrap();
    assert_eq!(body["product"]["name"], "Angelfish");
    assert_eq!(body["product_id"], 5);
    assert_eq!(body["image_path"], "fish1.jpg");
}

#[test]
fn product_view_without_category_has_no_category_key() {
    let p = product::Model { id: 1, version: 1, name: "Bulldog".into(), description: None, category_id: None };
    let body = serde_json::to_value(product::View::from_parts(p, None)).unwrap();
    assert!(body.get("category").is_none());
    assert!(body.get("category_id").is_none());
}
