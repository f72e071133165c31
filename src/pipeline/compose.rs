//! タイトル・要約・問いかけ・リンクを1通のメッセージに組み立てる。

/// 各要素を空行区切りで連結し、チャネルの文字数上限に収まるよう切り詰める。
/// 要約が無い場合はその段落ごと省く。
pub(crate) fn compose_message(
    title: &str,
    summary: Option<&str>,
    prompt: &str,
    link: &str,
    limit: usize,
) -> String {
    let mut sections: Vec<&str> = Vec::with_capacity(4);
    sections.push(title);
    if let Some(summary) = summary {
        sections.push(summary);
    }
    sections.push(prompt);
    sections.push(link);

    truncate_with_ellipsis(&sections.join("\n\n"), limit)
}

/// 上限を超えたときだけ切り詰める。切る位置は文末記号、次に空白、最後に
/// 文字境界の順で選び、落とした分は予約済みの3文字 `...` で示す。
/// 文字数はバイト数ではなく `char` 単位で数える。
fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let prefix: String = text.chars().take(limit.saturating_sub(3)).collect();

    if let Some(cut) = prefix.rfind(['.', '!', '?']) {
        if cut > 0 {
            return format!("{}...", &prefix[..=cut]);
        }
    }
    if let Some(cut) = prefix.rfind(' ') {
        if cut > 0 {
            return format!("{}...", &prefix[..cut]);
        }
    }

    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 280;

    #[test]
    fn short_assembly_is_returned_verbatim() {
        let message = compose_message(
            "AITA for this",
            Some("Top comment: NTA, obviously."),
            "What's your verdict? 🤔",
            "https://example.com/t3_abc",
            LIMIT,
        );

        assert_eq!(
            message,
            "AITA for this\n\nTop comment: NTA, obviously.\n\nWhat's your verdict? 🤔\n\nhttps://example.com/t3_abc"
        );
    }

    #[test]
    fn missing_summary_drops_its_paragraph() {
        let message = compose_message(
            "AITA for this",
            None,
            "What's your verdict? 🤔",
            "https://example.com/t3_abc",
            LIMIT,
        );

        assert_eq!(
            message,
            "AITA for this\n\nWhat's your verdict? 🤔\n\nhttps://example.com/t3_abc"
        );
    }

    #[test]
    fn result_never_exceeds_the_limit() {
        let long_summary = format!("From post: {}", "saga ".repeat(80));
        let message = compose_message(
            "AITA for a very long story",
            Some(&long_summary),
            "What's your verdict? 🤔",
            "https://example.com/t3_abc",
            LIMIT,
        );

        assert!(message.chars().count() <= LIMIT);
        assert!(message.ends_with("..."));
    }

    #[test]
    fn truncation_prefers_sentence_boundary() {
        let filler = "x".repeat(280);
        let text = format!("Start. {filler} never-ending tail words");

        let result = truncate_with_ellipsis(&text, LIMIT);

        assert_eq!(result, "Start....");
    }

    #[test]
    fn truncation_falls_back_to_word_boundary() {
        let text = format!("no sentence punctuation here {}", "y".repeat(280));

        let result = truncate_with_ellipsis(&text, LIMIT);

        assert_eq!(result, "no sentence punctuation here...");
    }

    #[test]
    fn truncation_hard_cuts_unbroken_text() {
        let text = "z".repeat(300);

        let result = truncate_with_ellipsis(&text, LIMIT);

        assert_eq!(result.chars().count(), LIMIT);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let text = "あ".repeat(300);

        let result = truncate_with_ellipsis(&text, LIMIT);

        assert_eq!(result.chars().count(), LIMIT);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn leading_punctuation_does_not_produce_empty_cut() {
        let text = format!(".{}", "word ".repeat(80));

        let result = truncate_with_ellipsis(&text, LIMIT);

        assert!(result.chars().count() <= LIMIT);
        assert!(result.len() > 4);
    }
}
