const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
const K: f64 = 1024.0;

/// Human readable size with base 1024 units, two decimals and trailing zeros trimmed.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit_index = 0;
    while value >= K && unit_index < UNITS.len() - 1 {
        value /= K;
        unit_index += 1;
    }

    format!("{} {}", trim_decimals(&format!("{:.2}", value)), UNITS[unit_index])
}

fn trim_decimals(fixed: &str) -> &str {
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed
    }
}
