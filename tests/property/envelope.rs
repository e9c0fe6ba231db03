//! Error envelope wire-format properties.

use auth_gate::{ApiError, Categorized, ErrorCategory, ErrorEnvelope};
use proptest::prelude::*;
use serde_json::json;

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "ERR_[A-Z_]{2,24}"]
}

fn arb_title() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[A-Za-z ]{1,24}"]
}

fn arb_detail() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-zA-Z0-9 ,]{1,40}"]
}

proptest! {
    /// serialize -> deserialize -> serialize is byte-identical after the
    /// first normalization pass, for any wire envelope.
    #[test]
    fn serialization_is_idempotent_after_one_pass(
        entries in prop::collection::vec((arb_key(), arb_title(), arb_detail()), 0..5),
    ) {
        let wire: Vec<serde_json::Value> = entries
            .iter()
            .map(|(key, title, detail)| {
                let mut object = serde_json::Map::new();
                if !key.is_empty() {
                    object.insert("key".to_string(), json!(key));
                }
                object.insert("title".to_string(), json!(title));
                if !detail.is_empty() {
                    object.insert("detail".to_string(), json!(detail));
                }
                serde_json::Value::Object(object)
            })
            .collect();
        let input = json!({ "errors": wire }).to_string();

        let first = ErrorEnvelope::from_json(&input).unwrap().to_json().unwrap();
        let second = ErrorEnvelope::from_json(&first).unwrap().to_json().unwrap();
        prop_assert_eq!(first, second);
    }

    /// Rendering keeps input order and duplicates.
    #[test]
    fn render_preserves_order(details in prop::collection::vec("[a-z ]{1,12}", 1..6)) {
        let envelope = ErrorEnvelope::render(details.iter().map(|detail| {
            Box::new(ApiError::from_category(ErrorCategory::Validation, "", detail.clone()))
                as Box<dyn Categorized>
        }));

        prop_assert_eq!(envelope.errors.len(), details.len());
        for (entry, detail) in envelope.errors.iter().zip(&details) {
            prop_assert_eq!(entry.detail(), Some(detail.as_str()));
            prop_assert_eq!(entry.title(), "Unprocessable Entity");
        }
    }

    /// An unclassified error's message never appears in the rendered record.
    #[test]
    fn unexpected_detail_never_equals_the_original_message(
        message in "[a-zA-Z0-9 ]{1,40}",
    ) {
        let envelope = ErrorEnvelope::unexpected(anyhow::anyhow!(message.clone()));

        let entry = &envelope.errors[0];
        prop_assert_eq!(entry.key(), Some("ERR_UNEXPECTED"));
        prop_assert_ne!(entry.detail(), Some(message.as_str()));
        prop_assert!(!envelope.to_json().unwrap().contains(&message));
    }
}
