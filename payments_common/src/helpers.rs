use std::str::FromStr;

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Parse an optional string into `T`. Missing values yield `Ok(None)`; values that do not parse yield the parser's
/// error so that the caller can decide how loudly to complain before falling back to a default.
pub fn parse_optional<T: FromStr>(value: Option<String>) -> Result<Option<T>, T::Err> {
    value.map(|v| v.trim().parse::<T>()).transpose()
}
