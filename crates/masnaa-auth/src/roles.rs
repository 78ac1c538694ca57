//! Primary-role selection.
//!
//! A user may hold several active roles. The one reported as `role` in the session
//! and the login response is picked by, in order: the role's `priority` column
//! (higher wins), the built-in precedence list, then the name alphabetically.

use std::cmp::Ordering;

/// Built-in roles from most to least privileged.
pub const PRECEDENCE: [&str; 6] = [
    "admin",
    "manager",
    "purchasing",
    "warehouse",
    "accountant",
    "viewer",
];

/// Reported when a user holds no active role.
pub const DEFAULT_ROLE: &str = "member";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedRole {
    pub name: String,
    pub priority: i32,
}

impl RankedRole {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
        }
    }

    fn precedence(&self) -> usize {
        PRECEDENCE
            .iter()
            .position(|known| known.eq_ignore_ascii_case(&self.name))
            .unwrap_or(PRECEDENCE.len())
    }
}

fn compare(a: &RankedRole, b: &RankedRole) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.precedence().cmp(&b.precedence()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Sorts roles most privileged first.
pub fn rank_roles(roles: &mut [RankedRole]) {
    roles.sort_by(compare);
}

pub fn primary_role(roles: &[RankedRole]) -> String {
    roles
        .iter()
        .min_by(|a, b| compare(a, b))
        .map(|role| role.name.clone())
        .unwrap_or_else(|| DEFAULT_ROLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_roles_is_member() {
        assert_eq!(primary_role(&[]), "member");
    }

    #[test]
    fn test_priority_wins() {
        let roles = vec![RankedRole::new("viewer", 10), RankedRole::new("Editor", 50)];
        assert_eq!(primary_role(&roles), "Editor");
    }

    #[test]
    fn test_precedence_breaks_priority_ties() {
        let roles = vec![
            RankedRole::new("viewer", 0),
            RankedRole::new("accountant", 0),
            RankedRole::new("Manager", 0),
        ];
        assert_eq!(primary_role(&roles), "Manager");
    }

    #[test]
    fn test_custom_roles_sorted_by_name_after_known() {
        let mut roles = vec![
            RankedRole::new("zeta", 0),
            RankedRole::new("alpha", 0),
            RankedRole::new("warehouse", 0),
        ];
        rank_roles(&mut roles);
        let names: Vec<_> = roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["warehouse", "alpha", "zeta"]);
    }
}
