use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

/// Types that can be requested as a forced tool call's `input`.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// JSON schema for the tool's `input_schema`, with `$ref`s inlined.
    fn tool_schema() -> serde_json::Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        let definitions = match &value {
            serde_json::Value::Object(map) => map.get("definitions").cloned(),
            _ => None,
        };
        if let Some(defs) = definitions {
            inline_refs(&mut value, &defs);
        }

        if let serde_json::Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn inline_refs(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                let name = ref_path.trim_start_matches("#/definitions/");
                if let Some(def) = definitions.get(name) {
                    let mut inlined = def.clone();
                    inline_refs(&mut inlined, definitions);
                    *value = inlined;
                    return;
                }
            }
            // schemars wraps a documented `$ref` field in a single-element `allOf`.
            if let Some(serde_json::Value::Array(all_of)) = map.get("allOf").cloned() {
                if let [only] = all_of.as_slice() {
                    *value = only.clone();
                    inline_refs(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs(v, definitions);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}
