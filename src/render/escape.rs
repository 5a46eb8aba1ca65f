// Markup escaping for user-sourced text

/// Escape reserved markup characters.
///
/// Hyphens become a numeric reference because the dictionary compiler
/// mangles literal hyphens in entry text. Apply once per field, right
/// before embedding; the output is not meant to be escaped again.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '>' => out.push_str("&gt;"),
            '<' => out.push_str("&lt;"),
            '-' => out.push_str("&#45;"),
            _ => out.push(c),
        }
    }
    out
}
