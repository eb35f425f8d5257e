use serde::de::DeserializeOwned;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedDocument<T> {
    pub document: T,
    pub format: DocumentFormat,
}

/// Parse a descriptor or shared-list file into any deserializable shape.
///
/// With [`DocumentFormat::Auto`], input starting with `{` or `[` is tried as JSON first,
/// everything else as YAML first; each falls back to the other format.
pub fn parse_document_str<T: DeserializeOwned>(
    input: &str,
    format: DocumentFormat,
) -> Result<ParsedDocument<T>, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedDocument {
            document: serde_json::from_str::<T>(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedDocument {
            document: serde_yaml::from_str::<T>(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_document_auto(input),
    }
}

/// Convenience wrapper returning a raw JSON value, which is what the validator consumes.
pub fn parse_value_str(input: &str) -> Result<serde_json::Value, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::UnknownFormat);
    }
    parse_document_str::<serde_json::Value>(input, DocumentFormat::Auto).map(|p| p.document)
}

fn parse_document_auto<T: DeserializeOwned>(input: &str) -> Result<ParsedDocument<T>, ParseError> {
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match serde_json::from_str::<T>(input) {
            Ok(doc) => Ok(ParsedDocument {
                document: doc,
                format: DocumentFormat::Json,
            }),
            Err(e) => match serde_yaml::from_str::<T>(input) {
                Ok(doc) => Ok(ParsedDocument {
                    document: doc,
                    format: DocumentFormat::Yaml,
                }),
                // JSON was tried first, so its error is the relevant one.
                Err(_) => Err(ParseError::Json(e)),
            },
        };
    }

    match serde_yaml::from_str::<T>(input) {
        Ok(doc) => Ok(ParsedDocument {
            document: doc,
            format: DocumentFormat::Yaml,
        }),
        Err(e) => {
            if let Ok(doc) = serde_json::from_str::<T>(input) {
                return Ok(ParsedDocument {
                    document: doc,
                    format: DocumentFormat::Json,
                });
            }
            Err(ParseError::Yaml(e))
        }
    }
}
