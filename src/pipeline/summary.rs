use aho_corasick::{AhoCorasick, AhoCorasickBuilder, BuildError};

use crate::clients::feed::FeedItem;

use super::normalize::normalize;

/// 要約として採用する最小文字数。これ未満は情報量不足として捨てる。
const MIN_EXTRACT_CHARS: usize = 20;
/// 抽出結果を切り詰める文字数。超過分は省略記号で置き換える。
const CLIP_CHARS: usize = 100;

/// スレッド本文または返信から要約向けの一節を選び出す。
pub(crate) struct SummaryExtractor {
    low_signal: AhoCorasick,
}

impl SummaryExtractor {
    /// `low_signal_markers` は返信を弾く笑い言葉などの部分一致語。設定から渡す。
    pub(crate) fn new(low_signal_markers: &[String]) -> Result<Self, BuildError> {
        let low_signal = AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .build(low_signal_markers)?;

        Ok(Self { low_signal })
    }

    /// 本文が使えれば `From post: `、だめなら最初の適格な返信を `Top comment: ` で返す。
    /// どちらも無ければ `None`。呼び出し側はタイトルとリンクだけで投稿文を組む。
    pub(crate) fn extract(&self, item: &FeedItem) -> Option<String> {
        if !item.body.trim().is_empty() {
            let cleaned = strip_title_prefix(&normalize(&item.body), &item.title);
            if cleaned.chars().count() >= MIN_EXTRACT_CHARS {
                return Some(format!("From post: {}", clip(&cleaned, CLIP_CHARS)));
            }
        }

        for reply in &item.replies {
            if reply.stickied || reply.from_submitter {
                continue;
            }
            if self.low_signal.is_match(&reply.body) {
                continue;
            }
            let normalized = normalize(&reply.body);
            if normalized.chars().count() < MIN_EXTRACT_CHARS {
                continue;
            }
            let cleaned = strip_title_prefix(&normalized, &item.title);
            return Some(format!("Top comment: {}", clip(&cleaned, CLIP_CHARS)));
        }

        None
    }
}

/// 本文がタイトルの繰り返しで始まる場合にその前置きを剥がす。
fn strip_title_prefix(text: &str, title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return text.to_string();
    }

    match text.get(..title.len()) {
        Some(head) if head.eq_ignore_ascii_case(title) => {
            text[title.len()..].trim_start().to_string()
        }
        _ => text.to_string(),
    }
}

fn clip(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
