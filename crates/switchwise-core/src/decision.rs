//! Rule-based recommendation synthesis.
//!
//! The rule table is evaluated top to bottom and the first matching rule
//! decides the outcome. When nothing matches, a generic `info` decision is
//! built from the inputs, so [`decide`] always returns exactly one
//! recommendation.
//!
//! | # | State | Category group | Suitability | Type |
//! |---|-------|----------------|-------------|------|
//! | 1 | tired | leisure browsing | harmful, bad | avoid_entertainment |
//! | 2 | highly_focused | social, messaging, video | bad, harmful | stay_focused |
//! | 3 | focused, highly_focused | deep work | good | continue_work |
//! | 4 | distracted, highly_distracted | video, social | any | avoid_distraction |
//! | 5 | tired | deep work except research | any | take_break |
//! | 6 | distracted | utility_productive | any | encourage_utility |
//! | 7 | tired | utility_productive | any | allow_utility |
//! | 8 | focused | communication | any | caution_communication |
//! | 9 | any | any | any | info |
//!
//! The exact category lists live in the rule table below.

use serde::Serialize;

use crate::types::{FocusState, Recommendation, Suitability, TaskCategory};

/// Identifier reported for the catch-all decision.
pub const DEFAULT_RULE_ID: u8 = 9;

const DEFAULT_KIND: &str = "info";
const DEFAULT_MESSAGE: &str = "Proceed with awareness.";

/// One row of the ordered rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// 1-based position in the table
    pub id: u8,
    /// States the rule applies to
    pub states: &'static [FocusState],
    /// Category labels the rule applies to
    pub categories: &'static [&'static str],
    /// Suitability labels the rule requires; `None` accepts any value
    pub suitability: Option<&'static [&'static str]>,
    pub kind: &'static str,
    pub reason: &'static str,
    pub message: &'static str,
}

impl Rule {
    pub fn matches(
        &self,
        state: FocusState,
        category: &TaskCategory,
        suitability: &Suitability,
    ) -> bool {
        self.states.contains(&state)
            && category.is_one_of(self.categories)
            && self
                .suitability
                .map_or(true, |accepted| suitability.is_one_of(accepted))
    }

    fn recommendation(&self) -> Recommendation {
        Recommendation {
            kind: self.kind.to_string(),
            message: self.message.to_string(),
        }
    }
}

use FocusState::{Distracted, Focused, HighlyDistracted, HighlyFocused, Tired};

static RULES: [Rule; 8] = [
    Rule {
        id: 1,
        states: &[Tired],
        categories: &[
            TaskCategory::ENTERTAINMENT_VIDEO,
            TaskCategory::SOCIAL_MEDIA,
            TaskCategory::LIGHT_BROWSING,
        ],
        suitability: Some(&[Suitability::HARMFUL, Suitability::BAD]),
        kind: "avoid_entertainment",
        reason: "User is tired and about to doomscroll.",
        message: concat!(
            "You're tired. ",
            "Watching this now will likely reduce your productivity further. ",
            "Take a 2-minute breathing break or a short walk instead.",
        ),
    },
    Rule {
        id: 2,
        states: &[HighlyFocused],
        categories: &[
            TaskCategory::SOCIAL_MEDIA,
            TaskCategory::COMMUNICATION,
            TaskCategory::ENTERTAINMENT_VIDEO,
        ],
        suitability: Some(&[Suitability::BAD, Suitability::HARMFUL]),
        kind: "stay_focused",
        reason: "This will break your deep flow state.",
        message: concat!(
            "You are in a high focus state. ",
            "Postpone messages and finish your current deep work block.",
        ),
    },
    Rule {
        id: 3,
        states: &[Focused, HighlyFocused],
        categories: &[
            TaskCategory::STUDYING_READING,
            TaskCategory::DEEP_WORK_CODING,
            TaskCategory::WRITING_NOTES,
            TaskCategory::RESEARCH_BROWSING,
        ],
        suitability: Some(&[Suitability::GOOD]),
        kind: "continue_work",
        reason: "Great alignment of state and task.",
        message: "You are doing great. Keep up the momentum.",
    },
    Rule {
        id: 4,
        states: &[Distracted, HighlyDistracted],
        categories: &[TaskCategory::ENTERTAINMENT_VIDEO, TaskCategory::SOCIAL_MEDIA],
        suitability: None,
        kind: "avoid_distraction",
        reason: "Using entertainment while distracted reduces control.",
        message: concat!(
            "You are already distracted. ",
            "Switching to this will make it harder to refocus. ",
            "Try a guided breathing exercise instead.",
        ),
    },
    Rule {
        id: 5,
        states: &[Tired],
        categories: &[
            TaskCategory::STUDYING_READING,
            TaskCategory::DEEP_WORK_CODING,
            TaskCategory::WRITING_NOTES,
        ],
        suitability: None,
        kind: "take_break",
        reason: "Efficiency will be low due to fatigue.",
        message: concat!(
            "You are tired. ",
            "Pushing through might be inefficient. ",
            "Take a short 5-minute recovery break, then resume.",
        ),
    },
    Rule {
        id: 6,
        states: &[Distracted],
        categories: &[TaskCategory::UTILITY_PRODUCTIVE],
        suitability: None,
        kind: "encourage_utility",
        reason: "Small productive wins help regain focus.",
        message: "Good idea. Clearing small tasks can help you get back into the flow.",
    },
    Rule {
        id: 7,
        states: &[Tired],
        categories: &[TaskCategory::UTILITY_PRODUCTIVE],
        suitability: None,
        kind: "allow_utility",
        reason: "Low energy tasks are perfect for now.",
        message: "This is a good use of your current energy level.",
    },
    Rule {
        id: 8,
        states: &[Focused],
        categories: &[TaskCategory::COMMUNICATION],
        suitability: None,
        kind: "caution_communication",
        reason: "Communication might break focus.",
        message: "Check if this is urgent. If not, consider batching emails/messages later.",
    },
];

/// Outcome of evaluating the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Rule that fired; [`DEFAULT_RULE_ID`] for the catch-all
    pub rule_id: u8,
    pub reason: String,
    pub recommendation: Recommendation,
}

impl Decision {
    pub fn is_default(&self) -> bool {
        self.rule_id == DEFAULT_RULE_ID
    }
}

/// The ordered rule table, excluding the catch-all.
pub fn rules() -> &'static [Rule] {
    &RULES
}

/// Map (state, category, suitability) to a recommendation.
///
/// Pure and infallible: identical inputs always produce identical output.
pub fn decide(state: FocusState, category: &TaskCategory, suitability: &Suitability) -> Decision {
    match RULES
        .iter()
        .find(|rule| rule.matches(state, category, suitability))
    {
        Some(rule) => {
            tracing::debug!(rule = rule.id, kind = rule.kind, "decision rule matched");
            Decision {
                rule_id: rule.id,
                reason: rule.reason.to_string(),
                recommendation: rule.recommendation(),
            }
        }
        None => {
            tracing::debug!("no decision rule matched, using default");
            Decision {
                rule_id: DEFAULT_RULE_ID,
                reason: format!("Transition from {state} to {category} is {suitability}."),
                recommendation: Recommendation {
                    kind: DEFAULT_KIND.to_string(),
                    message: DEFAULT_MESSAGE.to_string(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(state: FocusState, category: &str, suitability: &str) -> Decision {
        decide(state, &category.into(), &suitability.into())
    }

    #[test]
    fn table_ids_are_sequential() {
        let ids: Vec<u8> = rules().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn tired_doomscroll_wins_over_take_break() {
        let decision = run(Tired, "entertainment_video", "harmful");
        assert_eq!(decision.rule_id, 1);
        assert_eq!(decision.recommendation.kind, "avoid_entertainment");
        assert_eq!(decision.reason, "User is tired and about to doomscroll.");
    }

    #[test]
    fn tired_light_browsing_bad_is_avoid_entertainment() {
        assert_eq!(run(Tired, "light_browsing", "bad").recommendation.kind, "avoid_entertainment");
    }

    #[test]
    fn highly_focused_communication_bad_is_stay_focused() {
        let decision = run(HighlyFocused, "communication", "bad");
        assert_eq!(decision.rule_id, 2);
        assert_eq!(decision.recommendation.kind, "stay_focused");
        assert_eq!(decision.reason, "This will break your deep flow state.");
    }

    #[test]
    fn aligned_work_continues() {
        for state in [Focused, HighlyFocused] {
            let decision = run(state, "research_browsing", "good");
            assert_eq!(decision.recommendation.kind, "continue_work");
            assert_eq!(
                decision.recommendation.message,
                "You are doing great. Keep up the momentum."
            );
        }
    }

    #[test]
    fn distracted_entertainment_ignores_suitability() {
        for suitability in ["good", "neutral", "whatever"] {
            assert_eq!(run(HighlyDistracted, "social_media", suitability).rule_id, 4);
        }
    }

    #[test]
    fn tired_deep_work_takes_break() {
        assert_eq!(run(Tired, "writing_notes", "good").recommendation.kind, "take_break");
    }

    #[test]
    fn utility_rules_depend_on_state() {
        assert_eq!(
            run(Distracted, "utility_productive", "neutral").recommendation.kind,
            "encourage_utility"
        );
        assert_eq!(
            run(Tired, "utility_productive", "neutral").recommendation.kind,
            "allow_utility"
        );
        assert!(run(HighlyDistracted, "utility_productive", "neutral").is_default());
    }

    #[test]
    fn focused_communication_is_cautioned() {
        let decision = run(Focused, "communication", "neutral");
        assert_eq!(decision.rule_id, 8);
        assert_eq!(
            decision.recommendation.message,
            "Check if this is urgent. If not, consider batching emails/messages later."
        );
    }

    #[test]
    fn tired_neutral_video_falls_through_to_default() {
        let decision = run(Tired, "entertainment_video", "neutral");
        assert!(decision.is_default());
        assert_eq!(decision.reason, "Transition from tired to entertainment_video is neutral.");
        assert_eq!(decision.recommendation.kind, "info");
        assert_eq!(decision.recommendation.message, "Proceed with awareness.");
    }

    #[test]
    fn unknown_suitability_fails_conditioned_rules() {
        let decision = run(HighlyFocused, "social_media", "catastrophic");
        assert!(decision.is_default());
        assert_eq!(
            decision.reason,
            "Transition from highly_focused to social_media is catastrophic."
        );
    }

    fn any_state() -> impl Strategy<Value = FocusState> {
        prop::sample::select(FocusState::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn first_matching_rule_decides(
            state in any_state(),
            category in prop::sample::select(TaskCategory::CANONICAL.to_vec()),
            suitability in prop::sample::select(vec!["good", "neutral", "bad", "harmful", "odd"]),
        ) {
            let category = TaskCategory::from(category);
            let suitability = Suitability::from(suitability);
            let decision = decide(state, &category, &suitability);
            match rules().iter().find(|r| r.matches(state, &category, &suitability)) {
                Some(rule) => {
                    prop_assert_eq!(decision.rule_id, rule.id);
                    prop_assert_eq!(decision.recommendation.kind.as_str(), rule.kind);
                }
                None => {
                    prop_assert_eq!(decision.rule_id, DEFAULT_RULE_ID);
                    prop_assert_eq!(
                        decision.reason,
                        format!("Transition from {state} to {category} is {suitability}.")
                    );
                    prop_assert_eq!(decision.recommendation.kind.as_str(), "info");
                }
            }
        }

        #[test]
        fn unknown_categories_always_default(
            state in any_state(),
            label in "[a-z]{3,12}",
            suitability in "[a-z]{3,8}",
        ) {
            prop_assume!(!TaskCategory::CANONICAL.contains(&label.as_str()));
            let decision = decide(
                state,
                &TaskCategory::new(label.clone()),
                &Suitability::new(suitability.clone()),
            );
            prop_assert!(decision.is_default());
            prop_assert_eq!(
                decision.reason,
                format!("Transition from {state} to {label} is {suitability}.")
            );
        }

        #[test]
        fn decide_is_deterministic(
            state in any_state(),
            label in "[a-z_]{1,20}",
            suitability in "[a-z]{1,8}",
        ) {
            let category = TaskCategory::new(label);
            let suitability = Suitability::new(suitability);
            prop_assert_eq!(
                decide(state, &category, &suitability),
                decide(state, &category, &suitability)
            );
        }
    }
}
