use serde_json::Value;

/// Reads a bitrate field that mirrors report either as a number or as a
/// numeric string. Missing or unparsable values count as 0.
pub fn bitrate_of(format: &Value, key: &str) -> f64 {
    match format.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Highest-bitrate entry among `formats` that carries a `url`.
pub fn highest_bitrate<'a, I>(formats: I, key: &str) -> Option<&'a Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    formats
        .into_iter()
        .filter(|f| f.get("url").and_then(Value::as_str).is_some())
        .max_by(|a, b| bitrate_of(a, key).total_cmp(&bitrate_of(b, key)))
}

pub fn url_of(format: &Value) -> Option<String> {
    format.get("url").and_then(Value::as_str).map(str::to_string)
}

/// Host part of an instance base URL, for log labels.
pub fn host_of(instance: &str) -> &str {
    let rest = instance
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(instance);
    rest.split('/').next().unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_bitrate_accepts_numbers_and_strings() {
        assert_eq!(bitrate_of(&json!({"bitrate": 128000}), "bitrate"), 128000.0);
        assert_eq!(bitrate_of(&json!({"bitrate": "160000"}), "bitrate"), 160000.0);
        assert_eq!(bitrate_of(&json!({"bitrate": "n/a"}), "bitrate"), 0.0);
        assert_eq!(bitrate_of(&json!({}), "bitrate"), 0.0);
    }

    #[test]
    fn test_highest_bitrate_skips_entries_without_url() {
        let formats = json!([
            {"bitrate": 320000},
            {"bitrate": "128000", "url": "a"},
            {"bitrate": 160000, "url": "b"},
        ]);
        let best = highest_bitrate(formats.as_array().unwrap(), "bitrate").unwrap();
        assert_eq!(url_of(best).as_deref(), Some("b"));
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://pipedapi.kavin.rocks"), "pipedapi.kavin.rocks");
        assert_eq!(host_of("https://yewtu.be/"), "yewtu.be");
        assert_eq!(host_of("inv.example"), "inv.example");
    }
}
