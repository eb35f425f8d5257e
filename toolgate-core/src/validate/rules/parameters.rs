use serde_json::Value;

use crate::types::ParameterLocation;
use crate::validate::rules::common::{require_string, type_name, MISSING};
use crate::validate::validator::Validator;

pub(crate) fn validate_parameter_list(v: &mut Validator, path: &str, params: &[Value]) {
    for (idx, item) in params.iter().enumerate() {
        let ipath = format!("{path}[{idx}]");
        let Some(obj) = item.as_object() else {
            v.push(ipath, format!("Must be an object, got {}", type_name(item)));
            continue;
        };

        match obj.get("position") {
            Some(Value::Object(position)) => {
                let ppath = format!("{ipath}.position");
                require_string(v, position, &ppath, "key");
                require_string(v, position, &ppath, "value");
                if let Some(location) = require_string(v, position, &ppath, "location") {
                    if !ParameterLocation::ALLOWED.contains(&location) {
                        v.push(
                            format!("{ppath}.location"),
                            format!(
                                "Must be one of {}",
                                ParameterLocation::ALLOWED.join(", ")
                            ),
                        );
                    }
                }
            }
            Some(_) => v.push(format!("{ipath}.position"), "Must be an object"),
            None => v.push(format!("{ipath}.position"), MISSING),
        }

        match obj.get("z") {
            Some(Value::Object(z)) => {
                let zpath = format!("{ipath}.z");
                require_string(v, z, &zpath, "primitive");
                match z.get("options") {
                    None => {}
                    Some(Value::Array(options)) => {
                        for (oidx, option) in options.iter().enumerate() {
                            if !option.is_string() {
                                v.push(format!("{zpath}.options[{oidx}]"), "Must be a string");
                            }
                        }
                    }
                    Some(_) => v.push(format!("{zpath}.options"), "Must be an array"),
                }
            }
            Some(_) => v.push(format!("{ipath}.z"), "Must be an object"),
            None => v.push(format!("{ipath}.z"), MISSING),
        }
    }
}
