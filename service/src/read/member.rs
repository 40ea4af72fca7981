//! [`Member`] read model definitions.

use crate::domain::{team, Member, Team};

/// [`Member`] along with the [`Team`] joined to it, if any.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithTeam {
    /// Joined [`Member`].
    pub member: Member,

    /// [`Team`] joined to the [`Member`], if any.
    pub team: Option<Team>,
}

/// Way of joining [`Team`]s to all the [`Member`]s.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TeamJoin {
    /// Joins the [`Team`] a [`Member`] belongs to, but only when it has the
    /// provided [`team::Name`].
    Named(team::Name),

    /// Joins any [`Team`] named the same as a [`Member`], regardless of the
    /// [`Member`] belonging to it.
    Namesake,
}

/// Selector of [`Member`]s whose username equals to a name of some [`Team`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NamesakesOfTeams;

/// Aggregated statistics over [`Member`]s' ages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    /// Number of [`Member`]s.
    pub count: u64,

    /// Sum of all ages, if there are any [`Member`]s.
    pub sum: Option<i64>,

    /// Average age, if there are any [`Member`]s.
    pub avg: Option<f64>,

    /// Maximum age, if there are any [`Member`]s.
    pub max: Option<i32>,

    /// Minimum age, if there are any [`Member`]s.
    pub min: Option<i32>,
}

/// Key to sort [`Member`]s by.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SortKey {
    /// [`Member`]'s ID, which follows the creation order.
    Id,

    /// [`Member`]'s username.
    Username,

    /// [`Member`]'s age.
    Age,

    /// Name of the [`Team`] the [`Member`] belongs to.
    TeamName,
}

pub mod list {
    //! [`Member`]s list definitions.

    use crate::domain::member;
    #[cfg(doc)]
    use crate::domain::Member;

    /// Sorting of [`Member`]s.
    pub type Sort = common::Sort<super::SortKey>;

    /// Selector of a plain [`Member`]s list, without counting them.
    #[derive(Clone, Debug, Default)]
    pub struct Selector {
        /// Exact [`member::Age`] to filter by, if any.
        pub age: Option<member::Age>,

        /// Sorting to apply, in the order of precedence.
        ///
        /// Sorted by creation order if empty.
        pub sort: Vec<Sort>,

        /// Number of [`Member`]s to skip.
        pub offset: u64,

        /// Maximum number of [`Member`]s to return, if limited.
        pub limit: Option<u64>,
    }
}

pub mod search {
    //! [`Member`]s search definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::{member, team};
    #[cfg(doc)]
    use crate::domain::{Member, Team};

    define_pagination!(MemberTeam, super::SortKey);

    /// Projection of a [`Member`] joined with its [`Team`].
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct MemberTeam {
        /// ID of the [`Member`].
        pub member_id: member::Id,

        /// [`member::Username`] of the [`Member`], if any.
        pub username: Option<member::Username>,

        /// [`member::Age`] of the [`Member`].
        pub age: member::Age,

        /// ID of the [`Team`] the [`Member`] belongs to, if any.
        pub team_id: Option<team::Id>,

        /// [`team::Name`] of the [`Team`] the [`Member`] belongs to, if any.
        pub team_name: Option<team::Name>,
    }

    /// Search condition, each present field of which narrows the result.
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Condition {
        /// Exact [`member::Username`] to match.
        pub username: Option<member::Username>,

        /// Exact [`team::Name`] to match.
        pub team_name: Option<team::Name>,

        /// Inclusive lower bound of [`member::Age`].
        pub age_goe: Option<member::Age>,

        /// Inclusive upper bound of [`member::Age`].
        pub age_loe: Option<member::Age>,
    }

    impl Condition {
        /// Returns [`Predicate`]s of the present fields only.
        ///
        /// The [`Condition`] is satisfied when all of them are satisfied, so
        /// no [`Predicate`]s means no filtering at all.
        pub fn predicates(&self) -> impl Iterator<Item = Predicate<'_>> {
            let Self {
                username,
                team_name,
                age_goe,
                age_loe,
            } = self;

            [
                username.as_ref().map(Predicate::UsernameEq),
                team_name.as_ref().map(Predicate::TeamNameEq),
                age_goe.as_ref().map(Predicate::AgeGoe),
                age_loe.as_ref().map(Predicate::AgeLoe),
            ]
            .into_iter()
            .flatten()
        }

        /// Checks whether the provided [`MemberTeam`] satisfies this
        /// [`Condition`].
        #[must_use]
        pub fn matches(&self, row: &MemberTeam) -> bool {
            self.predicates().all(|p| p.matches(row))
        }
    }

    /// Single comparison of a [`MemberTeam`] column.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum Predicate<'a> {
        /// [`Member`]'s username equals to the provided one.
        UsernameEq(&'a member::Username),

        /// [`Team`]'s name equals to the provided one.
        TeamNameEq(&'a team::Name),

        /// [`Member`]'s age is greater than or equal to the provided one.
        AgeGoe(&'a member::Age),

        /// [`Member`]'s age is less than or equal to the provided one.
        AgeLoe(&'a member::Age),
    }

    impl Predicate<'_> {
        /// Checks whether the provided [`MemberTeam`] satisfies this
        /// [`Predicate`].
        ///
        /// Absent values never satisfy a comparison, the same way `NULL`
        /// doesn't in SQL.
        #[must_use]
        pub fn matches(&self, row: &MemberTeam) -> bool {
            match *self {
                Self::UsernameEq(username) => {
                    row.username.as_ref() == Some(username)
                }
                Self::TeamNameEq(name) => row.team_name.as_ref() == Some(name),
                Self::AgeGoe(age) => row.age >= *age,
                Self::AgeLoe(age) => row.age <= *age,
            }
        }
    }

    /// Selector of a [`Page`] of [`MemberTeam`]s.
    #[derive(Clone, Debug)]
    pub struct Selector {
        /// [`Condition`] to filter by.
        pub condition: Condition,

        /// Requested [`Pageable`].
        pub pageable: Pageable,

        /// Sorting to apply, in the order of precedence.
        ///
        /// Sorted by creation order of [`Member`]s if empty.
        pub sort: Vec<Sort>,
    }

    /// Total count of [`MemberTeam`]s satisfying a [`Condition`].
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(u64);

    #[cfg(test)]
    mod spec {
        use crate::domain::{member, team};

        use super::{Condition, MemberTeam, Predicate};

        fn row(
            username: Option<&str>,
            age: i32,
            team: Option<&str>,
        ) -> MemberTeam {
            MemberTeam {
                member_id: member::Id::new(),
                username: username.and_then(member::Username::new),
                age: member::Age::new(age).unwrap(),
                team_id: team.map(|_| team::Id::new()),
                team_name: team.and_then(team::Name::new),
            }
        }

        #[test]
        fn empty_condition_has_no_predicates() {
            let condition = Condition::default();

            assert_eq!(condition.predicates().count(), 0);
            assert!(condition.matches(&row(None, 0, None)));
        }

        #[test]
        fn skips_absent_fields() {
            let condition = Condition {
                age_goe: member::Age::new(20),
                ..Condition::default()
            };

            assert_eq!(
                condition.predicates().collect::<Vec<_>>(),
                [Predicate::AgeGoe(&member::Age::new(20).unwrap())],
            );
        }

        #[test]
        fn conjuncts_present_fields() {
            let condition = Condition {
                username: member::Username::new("member2"),
                team_name: team::Name::new("teamA"),
                age_goe: member::Age::new(15),
                age_loe: member::Age::new(25),
            };

            assert_eq!(condition.predicates().count(), 4);
            assert!(condition.matches(&row(Some("member2"), 20, Some("teamA"))));
            assert!(
                !condition.matches(&row(Some("member2"), 20, Some("teamB")))
            );
            assert!(
                !condition.matches(&row(Some("member2"), 30, Some("teamA")))
            );
            assert!(
                !condition.matches(&row(Some("member1"), 20, Some("teamA")))
            );
        }

        #[test]
        fn absent_column_never_matches() {
            let condition = Condition {
                team_name: team::Name::new("teamA"),
                ..Condition::default()
            };
            assert!(!condition.matches(&row(Some("member1"), 10, None)));

            let condition = Condition {
                username: member::Username::new("member1"),
                ..Condition::default()
            };
            assert!(!condition.matches(&row(None, 10, Some("teamA"))));
        }

        #[test]
        fn age_bounds_are_inclusive() {
            let condition = Condition {
                age_goe: member::Age::new(20),
                age_loe: member::Age::new(30),
                ..Condition::default()
            };

            assert!(!condition.matches(&row(None, 19, None)));
            assert!(condition.matches(&row(None, 20, None)));
            assert!(condition.matches(&row(None, 30, None)));
            assert!(!condition.matches(&row(None, 31, None)));
        }
    }
}
