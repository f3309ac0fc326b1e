//! Keyword answer resolver
//!
//! Answers free-text questions about a loan by substring matching against an
//! ordered keyword table. The first entry whose keyword appears in the
//! lowercased question wins, so table order is part of the contract: a
//! question mentioning both "covenants" and "leverage" gets the leverage
//! answer because leverage is listed first.

use std::time::Duration;

use shared_types::AnalysisResult;
use tracing::debug;

/// Pause before an answer is shown, so the chat reads as "thinking"
pub const DEFAULT_ANSWER_DELAY: Duration = Duration::from_millis(500);

/// Answer given when no keyword matches
pub const FALLBACK_ANSWER: &str = "I don't have specific information about that in the current document. Please try asking about interest rates, leverage, prepayment terms, defaults, collateral, or covenants.";

/// Canned prompts offered next to the chat
pub const SUGGESTED_QUESTIONS: &[&str] = &[
    "What is the interest rate structure?",
    "What happens if leverage exceeds 5.5x?",
    "Are there prepayment penalties?",
    "What are the Events of Default?",
    "What collateral secures the loan?",
    "Tell me about the covenants",
];

type Template = fn(&AnalysisResult) -> String;

/// A keyword and the answer it produces
pub struct AnswerEntry {
    pub keyword: &'static str,
    template: Template,
}

impl AnswerEntry {
    pub fn render(&self, context: &AnalysisResult) -> String {
        (self.template)(context)
    }
}

/// Keywords in match priority order
pub const ANSWER_TABLE: &[AnswerEntry] = &[
    AnswerEntry {
        keyword: "interest rate",
        template: interest_rate_answer,
    },
    AnswerEntry {
        keyword: "leverage",
        template: leverage_answer,
    },
    AnswerEntry {
        keyword: "prepayment",
        template: prepayment_answer,
    },
    AnswerEntry {
        keyword: "default",
        template: default_answer,
    },
    AnswerEntry {
        keyword: "collateral",
        template: collateral_answer,
    },
    AnswerEntry {
        keyword: "covenants",
        template: covenants_answer,
    },
];

/// First table entry whose keyword occurs in `question`, ignoring case
pub fn match_entry(question: &str) -> Option<&'static AnswerEntry> {
    let question_lower = question.to_lowercase();
    ANSWER_TABLE
        .iter()
        .find(|entry| question_lower.contains(entry.keyword))
}

/// Answer a question about `context`. Never fails; unknown topics get
/// [`FALLBACK_ANSWER`].
pub fn resolve(question: &str, context: &AnalysisResult) -> String {
    match match_entry(question) {
        Some(entry) => {
            debug!("Question matched keyword '{}'", entry.keyword);
            entry.render(context)
        }
        None => {
            debug!("No keyword matched question");
            FALLBACK_ANSWER.to_string()
        }
    }
}

/// Opening assistant message for a freshly analyzed document
pub fn greeting(context: &AnalysisResult) -> String {
    format!(
        "I'm analyzing the credit agreement for {}. Ask me anything about the loan terms, covenants, or risk factors.",
        context.borrower
    )
}

fn interest_rate_answer(ctx: &AnalysisResult) -> String {
    format!(
        "The interest rate is {}. This represents a margin of 325 basis points over SOFR (Secured Overnight Financing Rate). The rate is subject to a leverage-based pricing grid that can adjust the margin by +/- 50 bps based on the borrower's leverage ratio.",
        ctx.interest_rate
    )
}

fn leverage_answer(ctx: &AnalysisResult) -> String {
    format!(
        "Per Section 7.2, the maximum leverage ratio covenant is set at {}. This is notably higher than the market standard of 4.0x EBITDA, representing a 37.5% increase. If the ratio exceeds this threshold for two consecutive quarters, it constitutes an Event of Default.",
        ctx.leverage
    )
}

fn prepayment_answer(_: &AnalysisResult) -> String {
    "The credit agreement includes mandatory prepayment provisions in Section 5.3. The borrower must prepay 50% of Excess Cash Flow annually if leverage exceeds 4.0x, and 25% if leverage is below 4.0x. Voluntary prepayments are permitted without penalty after Year 2, with a 2% prepayment premium in Years 1-2.".to_string()
}

fn default_answer(_: &AnalysisResult) -> String {
    "Events of Default are detailed in Section 11 and include: (1) Payment default after 5 business days; (2) Cross-default to other debt over $25M; (3) Covenant breach beyond cure period; (4) Material misrepresentation; (5) Bankruptcy or insolvency; (6) Change of control; (7) Material adverse effect on collateral.".to_string()
}

fn collateral_answer(_: &AnalysisResult) -> String {
    "The loan is secured by a first-priority lien on substantially all assets of the borrower and guarantors, including accounts receivable, inventory, equipment, and intellectual property. Real estate is subject to separate mortgages. The collateral package is valued at approximately 1.4x the loan amount based on orderly liquidation values.".to_string()
}

fn covenants_answer(_: &AnalysisResult) -> String {
    "Financial covenants include: (1) Maximum Leverage Ratio of 5.5x (currently at high-risk level); (2) Minimum Interest Coverage of 3.0x; (3) Minimum Fixed Charge Coverage of 1.2x; (4) Minimum Liquidity of $25M at all times. These are tested quarterly, with the first test date 90 days after closing.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::sample_analysis;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn keyword_of(question: &str) -> Option<&'static str> {
        match_entry(question).map(|e| e.keyword)
    }

    #[test]
    fn test_table_order() {
        let keywords: Vec<_> = ANSWER_TABLE.iter().map(|e| e.keyword).collect();
        assert_eq!(
            keywords,
            vec![
                "interest rate",
                "leverage",
                "prepayment",
                "default",
                "collateral",
                "covenants"
            ]
        );
    }

    #[test]
    fn test_leverage_question_interpolates_leverage() {
        let result = sample_analysis();
        let answer = resolve("What's the leverage ratio?", &result);
        assert_eq!(answer, leverage_answer(&result));
        assert!(answer.contains(&result.leverage));
    }

    #[test]
    fn test_interest_rate_interpolates_rate_from_context() {
        let mut result = sample_analysis();
        result.interest_rate = "SOFR + 400 bps".to_string();
        let answer = resolve("Explain the INTEREST RATE please", &result);
        assert!(answer.starts_with("The interest rate is SOFR + 400 bps."));
    }

    #[test]
    fn test_first_match_wins_over_later_keywords() {
        let result = sample_analysis();
        let answer = resolve("Tell me about covenants and leverage", &result);
        assert_eq!(answer, leverage_answer(&result));
        assert_eq!(keyword_of("covenants, collateral, default?"), Some("default"));
    }

    #[test]
    fn test_first_match_is_by_table_order_not_position_in_question() {
        assert_eq!(
            keyword_of("collateral first, then the interest rate"),
            Some("interest rate")
        );
    }

    #[test]
    fn test_unknown_question_gets_fallback() {
        let result = sample_analysis();
        assert_eq!(resolve("What's the weather?", &result), FALLBACK_ANSWER);
        assert_eq!(resolve("", &result), FALLBACK_ANSWER);
    }

    #[test]
    fn test_paraphrases_do_not_match() {
        assert_eq!(keyword_of("What is the rate of interest?"), None);
        assert_eq!(keyword_of("Tell me about the covenant"), None);
        assert_eq!(keyword_of("levrage"), None);
    }

    #[test]
    fn test_substring_inside_longer_word_matches() {
        // "defaults" and "defaulted" both contain "default"
        assert_eq!(keyword_of("Has the borrower defaulted?"), Some("default"));
    }

    #[test]
    fn test_suggested_questions_all_have_answers() {
        let expected = [
            "interest rate",
            "leverage",
            "prepayment",
            "default",
            "collateral",
            "covenants",
        ];
        for (question, keyword) in SUGGESTED_QUESTIONS.iter().zip(expected) {
            assert_eq!(keyword_of(question), Some(keyword), "{}", question);
        }
    }

    #[test]
    fn test_greeting_names_borrower() {
        let result = sample_analysis();
        assert_eq!(
            greeting(&result),
            "I'm analyzing the credit agreement for Apex Manufacturing Ltd.. Ask me anything about the loan terms, covenants, or risk factors."
        );
    }

    #[test]
    fn test_resolve_does_not_mutate_context() {
        let result = sample_analysis();
        let before = result.clone();
        let _ = resolve("leverage", &result);
        assert_eq!(result, before);
    }

    proptest! {
        /// Property: text without any keyword always resolves to the fallback
        #[test]
        fn keyword_free_text_falls_back(text in "[xyzqj ]{0,80}") {
            let result = sample_analysis();
            prop_assert_eq!(resolve(&text, &result), FALLBACK_ANSWER);
        }

        /// Property: a keyword anywhere in the question is found regardless of case
        #[test]
        fn keyword_found_anywhere(
            prefix in "[xyz ]{0,20}",
            suffix in "[xyz ]{0,20}",
            idx in 0usize..6,
            upper in any::<bool>(),
        ) {
            let keyword = ANSWER_TABLE[idx].keyword;
            let keyword = if upper { keyword.to_uppercase() } else { keyword.to_string() };
            let question = format!("{}{}{}", prefix, keyword, suffix);
            prop_assert_eq!(keyword_of(&question), Some(ANSWER_TABLE[idx].keyword));
        }
    }
}
