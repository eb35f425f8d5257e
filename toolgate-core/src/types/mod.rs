mod common;
mod descriptor;
mod parameter;
mod shared_list;

pub use common::{AnyValue, JsonSchema};
pub use descriptor::{Descriptor, HttpMethod, MimeType, Output, Route, SharedListRef};
pub use parameter::{Parameter, ParameterLocation, Position, ValidationSpec};
pub use shared_list::{EntryFilter, ListMeta, SharedList, SharedListFile};
