#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Substituted into the route path.
    Insert,
    Query,
    Body,
}

impl ParameterLocation {
    pub const ALLOWED: [&'static str; 3] = ["insert", "query", "body"];
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Parameter {
    pub position: Position,
    pub z: ValidationSpec,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub key: String,
    /// A literal, `{{USER_PARAM}}`, `{{SERVER_PARAM:name}}` or `{{name}}`.
    pub value: String,
    pub location: ParameterLocation,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationSpec {
    pub primitive: String,
    #[serde(default)]
    pub options: Vec<String>,
}
