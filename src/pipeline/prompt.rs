use std::sync::Arc;

use rand::Rng;

/// タイトルのキーワード群と、その話題で使う問いかけ候補。先頭の組から順に照合する。
const PROMPT_GROUPS: &[(&[&str], &[&str])] = &[
    (
        &["aita", "amita", "wibta"],
        &[
            "What's your verdict? 🤔",
            "NTA or YTA? Cast your vote! ⚖️",
            "Who's in the wrong here? 🤔",
        ],
    ),
    (
        &[
            "relationship",
            "partner",
            "boyfriend",
            "girlfriend",
            "husband",
            "wife",
        ],
        &[
            "Relationship advice needed! What would you do? 💭",
            "Would you stay or walk away? 💭",
        ],
    ),
    (
        &["family", "parent", "child", "sibling"],
        &[
            "Family drama! What would you do? 🤔",
            "Could you keep the peace here? 🤔",
        ],
    ),
    (
        &["work", "job", "boss", "employee"],
        &[
            "Workplace situation! How would you handle it? 💼",
            "Would you escalate this to HR? 💼",
        ],
    ),
    (
        &["friend", "friendship"],
        &[
            "Friendship advice needed! What's your take? 🤝",
            "Is this friendship worth saving? 🤝",
        ],
    ),
];

const DEFAULT_PROMPTS: &[&str] = &[
    "What's your opinion on this? 🤔",
    "What would you have done? 💬",
];

/// 候補リストから1つ選ぶ乱択の差し替え口。テストでは固定実装を渡す。
pub(crate) trait IndexSource: Send + Sync {
    /// `0..len` のインデックスを返す。`len` は常に1以上。
    fn pick(&self, len: usize) -> usize;
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ThreadRngIndexSource;

impl IndexSource for ThreadRngIndexSource {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// タイトルに応じた問いかけ文を選ぶ。
pub(crate) struct PromptGenerator {
    index_source: Arc<dyn IndexSource>,
}

impl PromptGenerator {
    pub(crate) fn new(index_source: Arc<dyn IndexSource>) -> Self {
        Self { index_source }
    }

    /// タイトルに最初に見つかったキーワード群の候補から1つ選ぶ。
    /// どの群にも当たらなければ既定の問いかけを使う。
    pub(crate) fn prompt_for(&self, title: &str) -> String {
        let title = title.to_lowercase();
        let candidates = PROMPT_GROUPS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|keyword| title.contains(keyword)))
            .map_or(DEFAULT_PROMPTS, |(_, prompts)| *prompts);

        candidates[self.index_source.pick(candidates.len())].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct FixedIndexSource(usize);

    impl IndexSource for FixedIndexSource {
        fn pick(&self, len: usize) -> usize {
            self.0.min(len - 1)
        }
    }

    fn generator(index: usize) -> PromptGenerator {
        PromptGenerator::new(Arc::new(FixedIndexSource(index)))
    }

    #[rstest]
    #[case("AITA for skipping the wedding?", "What's your verdict? 🤔")]
    #[case("My boss read my diary at work", "Workplace situation! How would you handle it? 💼")]
    #[case("Completely unrelated saga", "What's your opinion on this? 🤔")]
    fn first_candidate_is_deterministic_with_fixed_source(
        #[case] title: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(generator(0).prompt_for(title), expected);
    }

    #[test]
    fn group_priority_resolves_multi_topic_titles() {
        // verdict 群は relationship 群より先に照合される
        let title = "WIBTA if I told my husband about the letter?";
        assert_eq!(generator(0).prompt_for(title), "What's your verdict? 🤔");
    }

    #[test]
    fn second_candidate_selected_when_source_says_so() {
        let title = "My sibling sold my concert tickets";
        assert_eq!(
            generator(1).prompt_for(title),
            "Could you keep the peace here? 🤔"
        );
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        assert_eq!(
            generator(0).prompt_for("UPDATE ON MY GIRLFRIEND SITUATION"),
            "Relationship advice needed! What would you do? 💭"
        );
    }

    #[test]
    fn randomized_choice_stays_within_candidate_set() {
        let generator = PromptGenerator::new(Arc::new(ThreadRngIndexSource));
        let verdict_set = [
            "What's your verdict? 🤔",
            "NTA or YTA? Cast your vote! ⚖️",
            "Who's in the wrong here? 🤔",
        ];

        for _ in 0..32 {
            let prompt = generator.prompt_for("AITA for this?");
            assert!(verdict_set.contains(&prompt.as_str()));
        }
    }
}
