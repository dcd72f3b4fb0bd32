//! Role resolution logic.
//!
//! Pure precedence and exact-match checks over a snapshot of the four
//! membership relations. Everything store-backed lives in
//! [`super::engine`]; this module has no I/O.

use crate::roles::ChannelRole;

/// Existence of the four relations for one `(user, channel)` pair,
/// captured from the store at a single point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSnapshot {
    /// Global super-user grant (not channel-scoped).
    pub super_user: bool,
    pub owner: bool,
    pub admin: bool,
    pub member: bool,
}

/// Precedence order for effective-role resolution, highest rank first.
///
/// This table is the single source of truth for "effective role": every
/// authorization decision that cares about rank goes through
/// [`resolve_role`], never through ad-hoc branching. A user may hold
/// several relation rows for one channel (a stale Member row after a
/// promotion is legal); the first matching entry wins deterministically
/// regardless of such lower rows.
pub const PRECEDENCE: [(fn(&RoleSnapshot) -> bool, ChannelRole); 4] = [
    (|s| s.super_user, ChannelRole::SuperUser),
    (|s| s.owner, ChannelRole::Owner),
    (|s| s.admin, ChannelRole::Admin),
    (|s| s.member, ChannelRole::Member),
];

/// Resolve the user's effective role for the channel.
///
/// Returns the highest-ranked role whose relation exists, else
/// [`ChannelRole::NotAllowed`].
#[must_use]
pub fn resolve_role(snapshot: &RoleSnapshot) -> ChannelRole {
    PRECEDENCE
        .iter()
        .find(|(holds, _)| holds(snapshot))
        .map_or(ChannelRole::NotAllowed, |(_, role)| *role)
}

/// Check the exact relation the required role names.
///
/// This is the direct role-gate check, not the precedence-based "at least"
/// variant: a global super-user with no Member row does *not* pass
/// `authorize(Member)`. `NotAllowed` is the negative assertion — true iff
/// the user holds none of the four relations for this channel. Kept as a
/// distinct explicit arm rather than derived from [`resolve_role`] so the
/// inverted semantics stay visible.
#[must_use]
pub const fn authorize(snapshot: &RoleSnapshot, required: ChannelRole) -> bool {
    match required {
        ChannelRole::Member => snapshot.member,
        ChannelRole::Admin => snapshot.admin,
        ChannelRole::Owner => snapshot.owner,
        ChannelRole::SuperUser => snapshot.super_user,
        ChannelRole::NotAllowed => {
            !(snapshot.member || snapshot.admin || snapshot.owner || snapshot.super_user)
        }
    }
}

/// True iff the resolved role is Admin, Owner or SuperUser.
///
/// The gate used by every mutating channel-administration operation.
/// Derived purely from [`resolve_role`].
#[must_use]
pub fn is_admin_or_above(snapshot: &RoleSnapshot) -> bool {
    resolve_role(snapshot) >= ChannelRole::Admin
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn snapshot(super_user: bool, owner: bool, admin: bool, member: bool) -> RoleSnapshot {
        RoleSnapshot {
            super_user,
            owner,
            admin,
            member,
        }
    }

    /// All 16 combinations of the four existence flags.
    fn all_snapshots() -> Vec<RoleSnapshot> {
        (0u8..16)
            .map(|bits| {
                snapshot(
                    bits & 8 != 0,
                    bits & 4 != 0,
                    bits & 2 != 0,
                    bits & 1 != 0,
                )
            })
            .collect()
    }

    #[test]
    fn empty_snapshot_resolves_to_not_allowed() {
        assert_eq!(
            resolve_role(&RoleSnapshot::default()),
            ChannelRole::NotAllowed
        );
    }

    #[test]
    fn single_relation_resolves_to_its_role() {
        assert_eq!(
            resolve_role(&snapshot(false, false, false, true)),
            ChannelRole::Member
        );
        assert_eq!(
            resolve_role(&snapshot(false, false, true, false)),
            ChannelRole::Admin
        );
        assert_eq!(
            resolve_role(&snapshot(false, true, false, false)),
            ChannelRole::Owner
        );
        assert_eq!(
            resolve_role(&snapshot(true, false, false, false)),
            ChannelRole::SuperUser
        );
    }

    #[test]
    fn precedence_masks_stale_lower_rows() {
        // Promoted member whose Member row was never cleaned up.
        assert_eq!(
            resolve_role(&snapshot(false, false, true, true)),
            ChannelRole::Admin
        );
        // Owner who is also admin and member.
        assert_eq!(
            resolve_role(&snapshot(false, true, true, true)),
            ChannelRole::Owner
        );
        // Super-user outranks every channel-scoped role.
        assert_eq!(
            resolve_role(&snapshot(true, true, true, true)),
            ChannelRole::SuperUser
        );
    }

    #[test]
    fn precedence_holds_for_every_combination() {
        for snap in all_snapshots() {
            let expected = if snap.super_user {
                ChannelRole::SuperUser
            } else if snap.owner {
                ChannelRole::Owner
            } else if snap.admin {
                ChannelRole::Admin
            } else if snap.member {
                ChannelRole::Member
            } else {
                ChannelRole::NotAllowed
            };
            assert_eq!(resolve_role(&snap), expected, "snapshot {snap:?}");
        }
    }

    #[test]
    fn authorize_is_exact_match_not_precedence() {
        // Global super-user with no channel rows.
        let snap = snapshot(true, false, false, false);
        assert!(authorize(&snap, ChannelRole::SuperUser));
        assert!(!authorize(&snap, ChannelRole::Member));
        assert!(!authorize(&snap, ChannelRole::Admin));
        assert!(!authorize(&snap, ChannelRole::Owner));

        // Admin row alone does not satisfy a Member gate.
        let snap = snapshot(false, false, true, false);
        assert!(authorize(&snap, ChannelRole::Admin));
        assert!(!authorize(&snap, ChannelRole::Member));
    }

    #[test]
    fn authorize_not_allowed_is_negation_of_the_rest() {
        for snap in all_snapshots() {
            let any_relation = snap.member || snap.admin || snap.owner || snap.super_user;
            assert_eq!(
                authorize(&snap, ChannelRole::NotAllowed),
                !any_relation,
                "snapshot {snap:?}"
            );
        }
    }

    #[test]
    fn admin_gate_matches_resolved_role() {
        for snap in all_snapshots() {
            let resolved = resolve_role(&snap);
            let expected = matches!(
                resolved,
                ChannelRole::Admin | ChannelRole::Owner | ChannelRole::SuperUser
            );
            assert_eq!(is_admin_or_above(&snap), expected, "snapshot {snap:?}");
        }
    }

    #[test]
    fn precedence_table_is_ranked_strictly_descending() {
        for pair in PRECEDENCE.windows(2) {
            assert!(pair[0].1 > pair[1].1);
        }
    }
}
