//! 生テキストから軽量マークアップとメタ情報行を取り除く正規化処理。

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use once_cell::sync::Lazy;
use unicode_normalization::UnicodeNormalization;

/// 編集メモや転載表記など、要約に載せないメタ情報行の判定語。
/// 行内に1つでも含まれていればその行ごと落とす。
const METADATA_PHRASES: [&str; 20] = [
    "i am not oop",
    "originally posted",
    "mood spoiler",
    "trigger warning",
    "content warning",
    "update:",
    "edit:",
    "tl;dr",
    "tldr",
    "editor's note",
    "note:",
    "thanks to",
    "credit to",
    "posted by",
    "submitted by",
    "reposted from",
    "crossposted from",
    "source:",
    "background:",
    "context:",
];

static METADATA_MATCHER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .build(METADATA_PHRASES)
        .expect("metadata automaton builds from fixed patterns")
});

/// 強調・引用・角括弧マーカーを除去し、メタ情報行を落とした1行テキストを返す。
///
/// 生き残った行は単一スペースで連結する。空入力は空文字列になり、
/// エラーにはしない。長さの上限はここでは掛けない。
pub(crate) fn normalize(text: &str) -> String {
    let stripped: String = text
        .nfc()
        .filter(|c| !matches!(c, '*' | '>' | '[' | ']'))
        .collect();

    let mut kept: Vec<&str> = Vec::new();
    for line in stripped.lines() {
        let line = line.trim();
        if line.is_empty() || METADATA_MATCHER.is_match(line) {
            continue;
        }
        kept.push(line);
    }

    kept.join(" ")
}
