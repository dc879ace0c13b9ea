const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

/// Human-readable size: plain bytes below 1 KiB, otherwise the largest
/// binary unit with one decimal unless the value is whole.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} bytes");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if value.fract() == 0.0 {
        format!("{value:.0} {}", UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Split a filename into stem and extension (extension keeps its dot).
///
/// `"Game (USA).bin"` → `("Game (USA)", ".bin")`. Leading dots do not start
/// an extension, so `".hidden"` has none.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    let trimmed = file_name.trim_start_matches('.');
    let lead = file_name.len() - trimmed.len();
    match trimmed.rfind('.') {
        Some(i) => file_name.split_at(lead + i),
        None => (file_name, ""),
    }
}
