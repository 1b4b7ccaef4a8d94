//! Pure predicates deciding which policies and rules apply to a user.

use super::domain::{ExpensePolicy, ExpenseRule, PolicyCondition, User};

impl PolicyCondition {
    /// Whether this condition admits the user. Position conditions fail for
    /// users without a recorded position.
    pub fn matches(&self, user: &User) -> bool {
        match self {
            PolicyCondition::Role(role) => user.role == *role,
            PolicyCondition::Grade(grade) => user.grade == *grade,
            PolicyCondition::Position(position) => {
                user.position.as_deref() == Some(position.as_str())
            }
        }
    }
}

/// A user is eligible for a policy iff every condition matches. An empty
/// condition list admits everyone.
pub fn is_eligible(policy: &ExpensePolicy, user: &User) -> bool {
    policy
        .conditions
        .iter()
        .all(|condition| condition.matches(user))
}

/// The selectable-policy list for the submission form.
pub fn eligible_policies<'a>(
    policies: &'a [ExpensePolicy],
    user: &User,
) -> Vec<&'a ExpensePolicy> {
    policies
        .iter()
        .filter(|policy| is_eligible(policy, user))
        .collect()
}

/// Rule-level conditions layered on top of the policy's own; same conjunction.
pub fn rule_applies_to(rule: &ExpenseRule, user: &User) -> bool {
    rule.user_conditions
        .iter()
        .all(|condition| condition.matches(user))
}
