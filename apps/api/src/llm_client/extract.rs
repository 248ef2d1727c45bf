//! Helpers for pulling a JSON object out of free-form model text.

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Removes every literal "```json" and "```" substring, then trims.
///
/// This is a plain substring replace: fence variants such as "```JSON" or
/// "~~~" are left in place.
pub fn strip_json_fences(text: &str) -> String {
    text.replace(JSON_FENCE, "")
        .replace(FENCE, "")
        .trim()
        .to_string()
}

/// Returns the first balanced `{...}` span in `text`, or `None` if there is
/// no opening brace or it is never closed.
///
/// Braces inside JSON string literals (including escaped quotes) do not
/// count toward the balance. The span is not validated as JSON.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
