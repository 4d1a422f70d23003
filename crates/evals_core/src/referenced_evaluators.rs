//! Resolution of the "referenced evaluators" choice when a template is edited.
//!
//! The choice only matters if evaluators currently reference the template by
//! name. With none, the policy is fixed to `Persist` and the control is
//! disabled.

use crate::types::ReferencedEvaluators;

/// Title and body of the notice shown after evaluators were repointed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn evaluators_updated() -> Self {
        Self {
            title: "Updated evaluators".into(),
            description: "Updated referenced evaluators to use new template version.".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencedEvaluatorsChoice {
    evaluator_count: usize,
    selected: ReferencedEvaluators,
}

impl Default for ReferencedEvaluatorsChoice {
    fn default() -> Self {
        Self::resolve(0)
    }
}

impl ReferencedEvaluatorsChoice {
    pub fn resolve(evaluator_count: usize) -> Self {
        let selected = if evaluator_count > 0 {
            ReferencedEvaluators::Update
        } else {
            ReferencedEvaluators::Persist
        };
        Self {
            evaluator_count,
            selected,
        }
    }

    pub fn evaluator_count(&self) -> usize {
        self.evaluator_count
    }

    pub fn selected(&self) -> ReferencedEvaluators {
        self.selected
    }

    pub fn default_policy(&self) -> ReferencedEvaluators {
        Self::resolve(self.evaluator_count).selected
    }

    pub fn is_disabled(&self) -> bool {
        self.evaluator_count == 0
    }

    pub fn selectable(&self) -> &'static [ReferencedEvaluators] {
        if self.is_disabled() {
            &[ReferencedEvaluators::Persist]
        } else {
            &[ReferencedEvaluators::Update, ReferencedEvaluators::Persist]
        }
    }

    /// Select a policy. Returns false and leaves the selection untouched if
    /// the policy is not selectable.
    pub fn choose(&mut self, policy: ReferencedEvaluators) -> bool {
        if self.selectable().contains(&policy) {
            self.selected = policy;
            true
        } else {
            false
        }
    }

    pub fn description(&self) -> String {
        let suffix = if self.is_disabled() {
            " No evaluators to update."
        } else {
            " Choose how to handle existing evaluators with this update."
        };
        format!(
            "{} evaluator(s) are currently using this template.{}",
            self.evaluator_count, suffix
        )
    }

    /// Notice to show after a successful save of an existing template.
    pub fn confirmation(&self) -> Option<Notice> {
        match self.selected {
            ReferencedEvaluators::Update => Some(Notice::evaluators_updated()),
            ReferencedEvaluators::Persist => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_references_forces_persist_and_disables() {
        let mut choice = ReferencedEvaluatorsChoice::resolve(0);
        assert_eq!(choice.selected(), ReferencedEvaluators::Persist);
        assert!(choice.is_disabled());
        assert_eq!(choice.selectable(), &[ReferencedEvaluators::Persist]);
        assert!(!choice.choose(ReferencedEvaluators::Update));
        assert_eq!(choice.selected(), ReferencedEvaluators::Persist);
        assert!(choice.confirmation().is_none());
    }

    #[test]
    fn references_default_to_update() {
        let choice = ReferencedEvaluatorsChoice::resolve(3);
        assert_eq!(choice.selected(), ReferencedEvaluators::Update);
        assert!(!choice.is_disabled());
        assert_eq!(choice.confirmation(), Some(Notice::evaluators_updated()));
    }

    #[test]
    fn persist_can_be_chosen_when_referenced() {
        let mut choice = ReferencedEvaluatorsChoice::resolve(1);
        assert!(choice.choose(ReferencedEvaluators::Persist));
        assert_eq!(choice.selected(), ReferencedEvaluators::Persist);
        assert_eq!(choice.default_policy(), ReferencedEvaluators::Update);
        assert!(choice.confirmation().is_none());
    }

    #[test]
    fn description_reflects_count() {
        assert_eq!(
            ReferencedEvaluatorsChoice::resolve(0).description(),
            "0 evaluator(s) are currently using this template. No evaluators to update."
        );
        assert_eq!(
            ReferencedEvaluatorsChoice::resolve(2).description(),
            "2 evaluator(s) are currently using this template. Choose how to handle existing evaluators with this update."
        );
    }
}
