use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_tokens: usize,
    pub new_tokens_24h: usize,
    pub volume_24h: String,
}

/// Formats a magnitude as `1.2M`, `450.0K` or the plain number below a thousand.
pub fn format_magnitude(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value == 0.0 {
        // also catches -0.0
        "0".to_string()
    } else {
        format!("{}", value)
    }
}
