//! Text rendering for container diagnostics.
//!
//! Resolution chains, long type paths and near-miss identifiers all end up
//! in error messages; the helpers here keep that output short and readable.

/// Joins a resolution chain with arrows.
///
/// # Examples
/// ```
/// use sanduq_support::rendering::render_chain;
///
/// let chain = ["app::Mailer", "app::Transport", "app::Mailer"];
/// assert_eq!(render_chain(&chain), "app::Mailer → app::Transport → app::Mailer");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    let mut out = String::new();
    for (i, link) in chain.iter().enumerate() {
        if i > 0 {
            out.push_str(" → ");
        }
        out.push_str(link.as_ref());
    }
    out
}

/// Drops module paths from every segment of a type name.
///
/// ```
/// use sanduq_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("app::mail::Mailer"), "Mailer");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn app::mail::Transport>"),
///     "Arc<dyn Transport>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut out = String::with_capacity(full_name.len());
    let mut segment = String::new();
    let mut chars = full_name.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                out.push_str(&segment);
                out.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    out.push_str(&segment);
    out
}

/// Ranks `available` names by similarity to `requested`.
///
/// Substring hits on the full name rank first, then hits on the shortened
/// name, then names sharing a common prefix of at least three characters.
/// At most `limit` names are returned, best first.
pub fn suggest_similar<'a>(
    requested: &str,
    available: impl IntoIterator<Item = &'a str>,
    limit: usize,
) -> Vec<String> {
    let wanted = requested.to_lowercase();
    let wanted_short = shorten_type_name(requested).to_lowercase();

    let mut ranked: Vec<(usize, &str)> = available
        .into_iter()
        .filter(|name| *name != requested)
        .filter_map(|name| {
            let lower = name.to_lowercase();
            if lower.contains(&wanted) || wanted.contains(&lower) {
                return Some((100, name));
            }

            let short = shorten_type_name(name).to_lowercase();
            if short.contains(&wanted_short) || wanted_short.contains(&short) {
                return Some((80, name));
            }

            let prefix = short
                .chars()
                .zip(wanted_short.chars())
                .take_while(|(a, b)| a == b)
                .count();
            (prefix >= 3).then_some((prefix * 10, name))
        })
        .collect();

    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_of_one() {
        assert_eq!(render_chain(&["Mailer"]), "Mailer");
    }

    #[test]
    fn empty_chain() {
        let chain: [&str; 0] = [];
        assert_eq!(render_chain(&chain), "");
    }

    #[test]
    fn shorten_plain_name() {
        assert_eq!(shorten_type_name("Mailer"), "Mailer");
    }

    #[test]
    fn shorten_nested_generics() {
        assert_eq!(
            shorten_type_name("std::collections::HashMap<alloc::string::String, app::Mailer>"),
            "HashMap<String, Mailer>"
        );
    }

    #[test]
    fn suggests_typo() {
        let available = ["app::Mailer", "app::MailQueue", "app::Database"];
        let suggestions = suggest_similar("app::Mailr", available, 3);
        assert!(!suggestions.is_empty());
        assert!(suggestions.iter().any(|s| s == "app::Mailer"));
        assert!(!suggestions.iter().any(|s| s == "app::Database"));
    }

    #[test]
    fn exact_name_is_not_suggested() {
        let suggestions = suggest_similar("mailer", ["mailer", "mailer.queue"], 3);
        assert_eq!(suggestions, vec!["mailer.queue".to_string()]);
    }

    #[test]
    fn nothing_close() {
        assert!(suggest_similar("zzz", ["app::Database"], 3).is_empty());
    }

    #[test]
    fn respects_limit() {
        let suggestions = suggest_similar("log", ["log.file", "log.stdout", "log.null"], 2);
        assert_eq!(suggestions.len(), 2);
    }
}
