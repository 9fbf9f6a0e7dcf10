/// Advisory pre-submit check for the manual path. The deadline path never
/// consults it: an expired clock submits whatever is on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitCheck {
    Ready,
    UnansweredRemaining { count: usize },
}

pub(crate) fn check(answered: usize, question_count: usize) -> SubmitCheck {
    let count = question_count.saturating_sub(answered);
    if count == 0 {
        SubmitCheck::Ready
    } else {
        SubmitCheck::UnansweredRemaining { count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_exact_unanswered_count() {
        assert_eq!(check(0, 2), SubmitCheck::UnansweredRemaining { count: 2 });
        assert_eq!(check(1, 2), SubmitCheck::UnansweredRemaining { count: 1 });
        assert_eq!(check(2, 2), SubmitCheck::Ready);
    }
}
