use std::collections::BTreeMap;

const ALWAYS_REDACTED: [&str; 3] = ["authorization", "cookie", "set-cookie"];

/// Copy of `headers` safe to log: credentials and server-param-derived values are masked.
pub fn redact_headers(
    headers: &BTreeMap<String, String>,
    secret_derived_header_names: &[String],
) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| {
            let masked = ALWAYS_REDACTED.iter().any(|h| k.eq_ignore_ascii_case(h))
                || secret_derived_header_names
                    .iter()
                    .any(|h| k.eq_ignore_ascii_case(h));
            let v = if masked { "<redacted>".to_string() } else { v.clone() };
            (k.clone(), v)
        })
        .collect()
}
