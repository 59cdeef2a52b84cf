/// Payload/view conversions and wire shape
pub mod entity_tests;
