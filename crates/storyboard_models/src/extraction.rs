//! Pulling JSON out of model output.

/// Extract the JSON payload from model output that may be wrapped in a
/// markdown fence or surrounded by prose.
///
/// Tries, in order: a fenced code block, the first balanced `[...]` or
/// `{...}` (whichever opens first), then the trimmed input.
///
/// # Examples
///
/// ```
/// use storyboard_models::extract_json;
///
/// assert_eq!(extract_json("```json\n[1, 2]\n```"), "[1, 2]");
/// assert_eq!(extract_json("Here you go: {\"a\": \"}\"} thanks"), "{\"a\": \"}\"}");
/// assert_eq!(extract_json("  [] "), "[]");
/// ```
pub fn extract_json(response: &str) -> &str {
    if let Some(block) = extract_from_code_block(response) {
        return block;
    }

    let open = match (response.find('['), response.find('{')) {
        (Some(b), Some(c)) if b < c => Some(('[', ']')),
        (Some(_), None) => Some(('[', ']')),
        (_, Some(_)) => Some(('{', '}')),
        (None, None) => None,
    };

    open.and_then(|(open, close)| extract_balanced(response, open, close))
        .unwrap_or_else(|| response.trim())
}

fn extract_from_code_block(response: &str) -> Option<&str> {
    let start = response.find("```")?;
    let after_fence = start + 3;
    // Skip the language tag, if any.
    let content_start = response[after_fence..]
        .find('\n')
        .map(|n| after_fence + n + 1)
        .unwrap_or(after_fence);

    let content = match response[content_start..].find("```") {
        Some(end) => &response[content_start..content_start + end],
        // Truncated output: take everything after the fence.
        None => &response[content_start..],
    };
    Some(content.trim())
}

fn extract_balanced(response: &str, open: char, close: char) -> Option<&str> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&response[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
