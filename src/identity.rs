//! Owner name resolution.
//!
//! Lookups are rebuilt from the users and rosters resources on every command
//! and discarded afterwards.

use crate::models::{Roster, RosterId, User, UserId, UNKNOWN_OWNER};
use std::collections::HashMap;

/// User id to display name.
#[derive(Debug, Clone, Default)]
pub struct UserNames {
    names: HashMap<UserId, String>,
}

impl UserNames {
    /// Display name for a user, or "Unknown" when the id is absent.
    pub fn name(&self, user_id: Option<&str>) -> &str {
        user_id
            .and_then(|id| self.names.get(id))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_OWNER)
    }
}

/// Roster id to owner display name.
#[derive(Debug, Clone, Default)]
pub struct OwnerNames {
    names: HashMap<RosterId, String>,
}

impl OwnerNames {
    /// Owner name for a roster, or "Unknown" when the roster is absent.
    pub fn name(&self, roster_id: RosterId) -> &str {
        self.names
            .get(&roster_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_OWNER)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

pub fn resolve_users(users: &[User]) -> UserNames {
    UserNames {
        names: users
            .iter()
            .map(|u| (u.id.clone(), u.display_name.clone()))
            .collect(),
    }
}

/// Every roster gets an entry; unmapped owners resolve to "Unknown".
pub fn resolve_roster_owners(rosters: &[Roster], users: &UserNames) -> OwnerNames {
    OwnerNames {
        names: rosters
            .iter()
            .map(|r| (r.id, users.name(r.owner_id.as_deref()).to_string()))
            .collect(),
    }
}

/// Find the roster whose owner name contains `query`, ignoring case.
///
/// When several owners match, the lowest roster id wins so the answer does
/// not depend on the order the API listed rosters in.
pub fn find_roster_by_owner_substring<'a>(
    rosters: &'a [Roster],
    users: &UserNames,
    query: &str,
) -> Option<&'a Roster> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    rosters
        .iter()
        .filter(|r| {
            users
                .name(r.owner_id.as_deref())
                .to_lowercase()
                .contains(&needle)
        })
        .min_by_key(|r| r.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str) -> User {
        User {
            id: id.to_string(),
            display_name: name.to_string(),
        }
    }

    fn roster(id: RosterId, owner: Option<&str>) -> Roster {
        Roster {
            id,
            owner_id: owner.map(String::from),
            wins: 0,
            losses: 0,
            ties: 0,
            points_for: 0.0,
            starters: vec![],
            players: vec![],
        }
    }

    #[test]
    fn test_owner_resolution_is_total() {
        let users = resolve_users(&[user("u1", "Alice")]);
        let rosters = vec![
            roster(1, Some("u1")),
            roster(2, Some("ghost")),
            roster(3, None),
        ];
        let owners = resolve_roster_owners(&rosters, &users);

        assert_eq!(owners.len(), 3);
        assert_eq!(owners.name(1), "Alice");
        assert_eq!(owners.name(2), UNKNOWN_OWNER);
        assert_eq!(owners.name(3), UNKNOWN_OWNER);
        assert_eq!(owners.name(99), UNKNOWN_OWNER);
        for r in &rosters {
            assert!(!owners.name(r.id).is_empty());
        }
    }

    #[test]
    fn test_find_roster_case_insensitive() {
        let users = resolve_users(&[user("u1", "Alice"), user("u2", "Bob")]);
        let rosters = vec![roster(1, Some("u1")), roster(2, Some("u2"))];

        let found = find_roster_by_owner_substring(&rosters, &users, "BO").unwrap();
        assert_eq!(found.id, 2);
        assert!(find_roster_by_owner_substring(&rosters, &users, "carol").is_none());
        assert!(find_roster_by_owner_substring(&rosters, &users, "  ").is_none());
    }

    #[test]
    fn test_find_roster_ambiguous_picks_lowest_id() {
        let users = resolve_users(&[user("u1", "Sam Smith"), user("u2", "Sammy")]);
        // API order lists the higher roster id first
        let rosters = vec![roster(7, Some("u2")), roster(4, Some("u1"))];

        let found = find_roster_by_owner_substring(&rosters, &users, "sam").unwrap();
        assert_eq!(found.id, 4);
    }
}
