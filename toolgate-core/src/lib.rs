#![forbid(unsafe_code)]

pub mod error;
pub mod lists;
pub mod parser;
pub mod scan;
pub mod shape;
pub mod template;
pub mod types;
pub mod validate;

pub use crate::error::{ParseError, ValidationError, Violation};
pub use crate::lists::{apply_filter, interpolate_enum, SharedLists};
pub use crate::parser::{parse_document_str, parse_value_str, DocumentFormat, ParsedDocument};
pub use crate::scan::{scan_source, ScanFinding, ScanReport, FORBIDDEN_PATTERNS};
pub use crate::shape::{route_input_schema, InputShape};
pub use crate::types::Descriptor;
pub use crate::validate::{validate_main, MAX_ROUTES};
