use serde_json::Value;

/// Placeholder shown for values the federation did not report.
pub const MISSING: &str = "-";

/// Human readable uptime, keeping the two most significant units.
pub fn uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Renders a JSON scalar for a table cell.
pub fn scalar(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING.to_string(),
        Some(Value::String(s)) if s.is_empty() => MISSING.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{:.1}", f),
            _ => n.to_string(),
        },
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| scalar(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// The first of `keys` present on `value`; the federation is not consistent
/// about camelCase versus snake_case.
pub fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|v| !v.is_null())
}

/// Reads a numeric field that may arrive as a number or a numeric string.
pub fn number(value: &Value, keys: &[&str]) -> Option<f64> {
    as_number(field(value, keys)?)
}

/// A number, or a numeric string with an optional trailing `%`.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

/// Turns `camelCase` and `snake_case` keys into "Title Case" labels.
pub fn label(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut capitalize = true;
    for c in key.chars() {
        if c == '_' || c == '-' {
            out.push(' ');
            capitalize = true;
            continue;
        }
        if c.is_uppercase() && !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
        if capitalize {
            out.extend(c.to_uppercase());
            capitalize = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uptime_keeps_two_units() {
        assert_eq!(uptime(0), "0s");
        assert_eq!(uptime(59), "59s");
        assert_eq!(uptime(61), "1m 1s");
        assert_eq!(uptime(3_600 * 5 + 60 * 12 + 7), "5h 12m");
        assert_eq!(uptime(86_400 * 3 + 3_600 * 4 + 5), "3d 4h");
    }

    #[test]
    fn scalars_render_for_cells() {
        assert_eq!(scalar(None), "-");
        assert_eq!(scalar(Some(&json!(null))), "-");
        assert_eq!(scalar(Some(&json!(""))), "-");
        assert_eq!(scalar(Some(&json!("active"))), "active");
        assert_eq!(scalar(Some(&json!(42))), "42");
        assert_eq!(scalar(Some(&json!(97.26))), "97.3");
        assert_eq!(scalar(Some(&json!(["quiz", "tracker"]))), "quiz, tracker");
    }

    #[test]
    fn field_prefers_first_present_key() {
        let value = json!({"neuron_id": "snake", "neuronId": null, "id": "plain"});
        assert_eq!(field(&value, &["neuronId", "neuron_id", "id"]), Some(&json!("snake")));
        assert_eq!(field(&value, &["missing"]), None);
    }

    #[test]
    fn numbers_accept_strings() {
        let value = json!({"healthScore": "87%", "uptime": 12});
        assert_eq!(number(&value, &["healthScore"]), Some(87.0));
        assert_eq!(number(&value, &["uptime"]), Some(12.0));
    }

    #[test]
    fn labels_are_title_cased() {
        assert_eq!(label("totalNeurons"), "Total Neurons");
        assert_eq!(label("average_health"), "Average Health");
    }
}
