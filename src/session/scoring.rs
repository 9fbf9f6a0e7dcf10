use crate::domain::models::AssessmentDefinition;
use crate::session::answers::AnswerSnapshot;

/// Deterministic grading of one snapshot against one definition. Selected
/// ids come out in question order; an unanswered question contributes
/// nothing to the list and nothing to the count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scorecard {
    pub correct_answers: u32,
    pub selected_option_ids: Vec<String>,
}

pub fn score(definition: &AssessmentDefinition, snapshot: &AnswerSnapshot) -> Scorecard {
    let mut correct_answers = 0;
    let mut selected_option_ids = Vec::with_capacity(snapshot.answered_count());

    for question in &definition.questions {
        let Some(option_id) = snapshot.selected(&question.id) else {
            continue;
        };
        selected_option_ids.push(option_id.to_string());
        if question.option(option_id).is_some_and(|option| option.correct) {
            correct_answers += 1;
        }
    }

    Scorecard { correct_answers, selected_option_ids }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::session::answers::AnswerSheet;
    use crate::test_support;

    #[test]
    fn empty_snapshot_scores_zero_without_error() {
        let definition = test_support::two_question_definition();
        let sheet = AnswerSheet::seeded(Arc::new(definition.clone()));

        let scorecard = score(&definition, &sheet.snapshot());
        assert_eq!(scorecard.correct_answers, 0);
        assert!(scorecard.selected_option_ids.is_empty());
    }

    #[test]
    fn counts_only_last_written_correct_options() {
        let definition = test_support::two_question_definition();
        let mut sheet = AnswerSheet::seeded(Arc::new(definition.clone()));

        // Correct pick on q-1 is later overwritten by the wrong one.
        sheet.select("q-1", "o-1a").expect("pick q-1");
        sheet.select("q-1", "o-1b").expect("overwrite q-1");
        sheet.select("q-2", "o-2a").expect("pick q-2");

        let scorecard = score(&definition, &sheet.snapshot());
        assert_eq!(scorecard.correct_answers, 1);
        assert_eq!(scorecard.selected_option_ids, vec!["o-1b".to_string(), "o-2a".to_string()]);
    }

    #[test]
    fn selected_ids_follow_question_order() {
        let definition = test_support::two_question_definition();
        let mut sheet = AnswerSheet::seeded(Arc::new(definition.clone()));

        sheet.select("q-2", "o-2a").expect("pick q-2 first");
        sheet.select("q-1", "o-1a").expect("pick q-1 second");

        let scorecard = score(&definition, &sheet.snapshot());
        assert_eq!(scorecard.selected_option_ids, vec!["o-1a".to_string(), "o-2a".to_string()]);
        assert_eq!(scorecard.correct_answers, 2);
    }
}
