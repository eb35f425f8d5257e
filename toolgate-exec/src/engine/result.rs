use serde::Serialize;
use serde_json::Value;

/// Outcome of one route invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStruct {
    pub status: bool,
    pub messages: Vec<String>,
    pub data: Value,
    pub data_as_string: String,
}

impl Default for RequestStruct {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestStruct {
    pub fn new() -> Self {
        Self {
            status: true,
            messages: Vec::new(),
            data: Value::Null,
            data_as_string: String::new(),
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = false;
        self.messages.push(message.into());
    }

    pub(crate) fn finish(mut self) -> Self {
        self.data_as_string = render_data(&self.data);
        self
    }
}

/// Printable form of response data.
///
/// JSON first; YAML accepts map keys JSON rejects; the `Debug` dump always succeeds.
pub fn render_data<T: Serialize + std::fmt::Debug + ?Sized>(data: &T) -> String {
    if let Ok(s) = serde_json::to_string(data) {
        return s;
    }
    if let Ok(s) = serde_yaml::to_string(data) {
        return s;
    }
    format!("{data:?}")
}
