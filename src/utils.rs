pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Cuts `text` to at most `width` characters, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_scheme() {
        assert_eq!(normalize_url(" chat.example.org "), "https://chat.example.org");
        assert_eq!(normalize_url("http://localhost:8000"), "http://localhost:8000");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Ada", 5), "Ada");
        assert_eq!(truncate("Ada Lovelace", 5), "Ada …");
    }
}
