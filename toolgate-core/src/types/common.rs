pub type AnyValue = serde_json::Value;
pub type JsonSchema = serde_json::Value;
