//! Human-readable byte size formatting.

const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

/// Formats a byte count using binary (1024-based) units.
///
/// Values are rendered with one decimal place, with a trailing `.0` trimmed
/// so round sizes stay compact.
///
/// # Examples
///
/// ```
/// use measurements::format_bytes;
///
/// assert_eq!(format_bytes(512), "512B");
/// assert_eq!(format_bytes(1024), "1KiB");
/// assert_eq!(format_bytes(1536), "1.5KiB");
/// assert_eq!(format_bytes(1048576), "1MiB");
/// ```
pub fn format_bytes(n: u64) -> String {
    if n < 1024 {
        return format!("{n}B");
    }

    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.1}");
    let trimmed = formatted.strip_suffix(".0").unwrap_or(&formatted);
    format!("{trimmed}{}", UNITS[unit])
}
