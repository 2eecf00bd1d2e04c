//! Text formatting helpers shared by the query, rcon and log paths.

/// Remove color tags (`^0` through `^9`) from text.
///
/// Player names and server output embed these tags for in-game coloring;
/// they are meaningless on the chat side. Order-preserving, and stripping
/// twice equals stripping once.
pub fn strip_color_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '^' && matches!(chars.peek(), Some(d) if d.is_ascii_digit()) {
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

/// Render a duration in whole seconds as space-joined components,
/// largest unit first: `1d 2h 3m 4s`.
///
/// Zero units are omitted, except that a zero duration renders as `"0s"`.
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    let mut components = Vec::new();
    if days > 0 {
        components.push(format!("{days}d"));
    }
    if hours > 0 {
        components.push(format!("{hours}h"));
    }
    if minutes > 0 {
        components.push(format!("{minutes}m"));
    }
    if secs > 0 || components.is_empty() {
        components.push(format!("{secs}s"));
    }

    components.join(" ")
}

/// Format a connected-time field as received off the wire.
///
/// The protocol carries seconds as text, sometimes fractional. Truncates to
/// whole seconds; a field that does not parse as a number is passed through
/// unchanged rather than rejected.
pub fn format_duration_field(field: &str) -> String {
    match field.trim().parse::<f64>() {
        Ok(value) if value >= 0.0 => format_duration(value as u64),
        _ => field.to_string(),
    }
}
