use super::common::{employee, manager, travel_policy};
use crate::expenses::domain::{Grade, PolicyCondition, Role};
use crate::expenses::eligibility::{eligible_policies, is_eligible, rule_applies_to};

#[test]
fn every_condition_must_hold() {
    let policy = travel_policy();
    assert!(is_eligible(&policy, &employee()));

    // Right role, wrong grade.
    let mut wrong_grade = employee();
    wrong_grade.grade = Grade::Ms3;
    assert!(!is_eligible(&policy, &wrong_grade));

    // Right grade, wrong role.
    let mut wrong_role = employee();
    wrong_role.role = Role::Manager;
    assert!(!is_eligible(&policy, &wrong_role));
}

#[test]
fn empty_condition_list_admits_everyone() {
    let mut policy = travel_policy();
    policy.conditions.clear();
    assert!(is_eligible(&policy, &employee()));
    assert!(is_eligible(&policy, &manager()));
}

#[test]
fn position_condition_fails_without_a_recorded_position() {
    let mut policy = travel_policy();
    policy.conditions = vec![PolicyCondition::Position("Sales Head".to_string())];

    assert!(is_eligible(&policy, &manager()));
    assert!(!is_eligible(&policy, &employee()));

    let mut other_position = manager();
    other_position.position = Some("Region Head".to_string());
    assert!(!is_eligible(&policy, &other_position));
}

#[test]
fn eligible_policies_filters_by_user() {
    let travel = travel_policy();
    let mut open = travel_policy();
    open.id = crate::expenses::domain::PolicyId("2".to_string());
    open.conditions.clear();
    let policies = vec![travel, open];

    let for_employee = eligible_policies(&policies, &employee());
    assert_eq!(for_employee.len(), 2);

    let for_manager = eligible_policies(&policies, &manager());
    assert_eq!(for_manager.len(), 1);
    assert_eq!(for_manager[0].id.0, "2");
}

#[test]
fn rule_conditions_layer_on_top_of_policy_conditions() {
    let mut rule = travel_policy().rules[0].clone();
    assert!(rule_applies_to(&rule, &employee()));

    rule.user_conditions = vec![PolicyCondition::Role(Role::Manager)];
    assert!(!rule_applies_to(&rule, &employee()));
    assert!(rule_applies_to(&rule, &manager()));
}
