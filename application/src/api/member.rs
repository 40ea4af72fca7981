//! [`Member`]-related definitions.

use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, read, Query as _};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A member, optionally belonging to a `Team`.
#[derive(Clone, Debug, From)]
pub struct Member(domain::Member);

/// A member, optionally belonging to a `Team`.
#[graphql_object(context = Context)]
impl Member {
    /// Unique identifier of this `Member`.
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Username of this `Member`, if any.
    pub fn username(&self) -> Option<Username> {
        self.0.username.clone().map(Into::into)
    }

    /// Age of this `Member` in years.
    pub fn age(&self) -> i32 {
        self.0.age.into()
    }

    /// ID of the `Team` this `Member` belongs to, if any.
    pub fn team_id(&self) -> Option<api::team::Id> {
        self.0.team_id.map(Into::into)
    }

    /// `Team` this `Member` belongs to, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Member.team",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn team(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Team>, Error> {
        let Some(id) = self.0.team_id else {
            return Ok(None);
        };
        ctx.service()
            .execute(query::team::ById::by(id))
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map_ok(|t| t.map(Into::into))
            .await
    }
}

/// A `Member` along with the `Team` joined to it.
#[derive(Clone, Debug, From)]
pub struct WithTeam(read::WithTeam);

/// A `Member` along with the `Team` joined to it.
#[graphql_object(name = "MemberWithTeam", context = Context)]
impl WithTeam {
    /// Joined `Member`.
    pub fn member(&self) -> Member {
        self.0.member.clone().into()
    }

    /// `Team` joined to the `Member`, if any.
    ///
    /// Depending on the join, it's not necessarily the `Team` the `Member`
    /// belongs to.
    pub fn team(&self) -> Option<api::Team> {
        self.0.team.clone().map(Into::into)
    }
}

/// Aggregated statistics over ages of all the `Member`s.
#[derive(Clone, Copy, Debug, From)]
pub struct Stats(read::member::Stats);

/// Aggregated statistics over ages of all the `Member`s.
#[graphql_object(name = "MemberStats", context = Context)]
impl Stats {
    /// Number of `Member`s.
    pub fn count(&self) -> Result<i32, Error> {
        i32::try_from(self.0.count).map_err(AsError::into_error)
    }

    /// Sum of all ages, if there are any `Member`s.
    #[expect(clippy::cast_precision_loss, reason = "sum of ages is small")]
    pub fn sum(&self) -> Option<f64> {
        self.0.sum.map(|s| s as f64)
    }

    /// Average age, if there are any `Member`s.
    pub fn avg(&self) -> Option<f64> {
        self.0.avg
    }

    /// Maximum age, if there are any `Member`s.
    pub fn max(&self) -> Option<i32> {
        self.0.max
    }

    /// Minimum age, if there are any `Member`s.
    pub fn min(&self) -> Option<i32> {
        self.0.min
    }
}

/// Unique identifier of a `Member`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::member::Id)]
#[into(domain::member::Id)]
#[graphql(name = "MemberId", transparent)]
pub struct Id(Uuid);

/// Username of a `Member`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "MemberUsername",
    with = scalar::Validated::<domain::member::Username>,
)]
pub struct Username(domain::member::Username);

pub mod search {
    //! `Member`s search definitions.

    use common::pagination::{Direction, Nulls};
    use juniper::{graphql_object, GraphQLEnum, GraphQLInputObject};
    use service::{
        domain::{member, team},
        infra::Postgres,
        query::members::LazyPage,
        read::member::{self as read_member, search},
    };

    use crate::{api, define_error, AsError, Context, Error};

    /// Condition to search `Member`s by.
    ///
    /// Absent or empty fields don't narrow the search, the present ones must
    /// all be satisfied.
    #[derive(Clone, Debug, Default, GraphQLInputObject)]
    #[graphql(name = "MemberSearchCondition")]
    pub struct Condition {
        /// Exact username of a `Member`.
        pub username: Option<String>,

        /// Exact name of the `Team` a `Member` belongs to.
        pub team_name: Option<String>,

        /// Minimal age of a `Member`, inclusive.
        pub age_goe: Option<i32>,

        /// Maximal age of a `Member`, inclusive.
        pub age_loe: Option<i32>,
    }

    impl TryFrom<Condition> for search::Condition {
        type Error = ArgumentsError;

        fn try_from(value: Condition) -> Result<Self, Self::Error> {
            /// Parses the provided optional `value`, treating an empty one as
            /// absent.
            fn parse<T>(
                value: Option<String>,
                new: impl FnOnce(String) -> Option<T>,
            ) -> Result<Option<T>, ArgumentsError> {
                value
                    .filter(|v| !v.is_empty())
                    .map(|v| new(v).ok_or(ArgumentsError::InvalidCondition))
                    .transpose()
            }

            /// Parses the provided optional age.
            fn age(
                value: Option<i32>,
            ) -> Result<Option<member::Age>, ArgumentsError> {
                value
                    .map(|v| {
                        member::Age::new(v)
                            .ok_or(ArgumentsError::InvalidCondition)
                    })
                    .transpose()
            }

            let Condition {
                username,
                team_name,
                age_goe,
                age_loe,
            } = value;

            Ok(Self {
                username: parse(username, member::Username::new)?,
                team_name: parse(team_name, team::Name::new)?,
                age_goe: age(age_goe)?,
                age_loe: age(age_loe)?,
            })
        }
    }

    /// Key to sort `Member`s by.
    #[derive(Clone, Copy, Debug, GraphQLEnum)]
    #[graphql(name = "MemberSortKey")]
    pub enum SortKey {
        /// `Member`'s ID, following the creation order.
        Id,

        /// `Member`'s username.
        Username,

        /// `Member`'s age.
        Age,

        /// Name of the `Team` a `Member` belongs to.
        TeamName,
    }

    impl From<SortKey> for read_member::SortKey {
        fn from(key: SortKey) -> Self {
            match key {
                SortKey::Id => Self::Id,
                SortKey::Username => Self::Username,
                SortKey::Age => Self::Age,
                SortKey::TeamName => Self::TeamName,
            }
        }
    }

    /// Sorting of `Member`s.
    #[derive(Clone, Copy, Debug, GraphQLInputObject)]
    #[graphql(name = "MemberSort")]
    pub struct Sort {
        /// Key to sort by.
        pub key: SortKey,

        /// Direction of sorting.
        #[graphql(default = Direction::Ascending)]
        pub direction: Direction,

        /// Placement of absent values, database default if not specified.
        pub nulls: Option<Nulls>,
    }

    impl From<Sort> for common::Sort<read_member::SortKey> {
        fn from(sort: Sort) -> Self {
            let Sort {
                key,
                direction,
                nulls,
            } = sort;
            Self {
                key: key.into(),
                direction,
                nulls,
            }
        }
    }

    /// Strategy of fetching a `MemberTeamPage`.
    #[derive(Clone, Copy, Debug, Default, GraphQLEnum)]
    #[graphql(name = "PagingStrategy")]
    pub enum Strategy {
        /// Content and total count are fetched with a single statement.
        Simple,

        /// Content and total count are fetched with separate statements in
        /// a single read-only snapshot.
        Complex,

        /// Total count is fetched only if it's requested.
        Deferred,

        /// Total count is fetched only if it can't be inferred from the
        /// content.
        #[default]
        Optimized,
    }

    /// Projection of a `Member` joined with its `Team`.
    #[derive(Clone, Debug)]
    pub struct MemberTeam(search::MemberTeam);

    /// Projection of a `Member` joined with its `Team`.
    #[graphql_object(context = Context)]
    impl MemberTeam {
        /// ID of the `Member`.
        pub fn member_id(&self) -> api::member::Id {
            self.0.member_id.into()
        }

        /// Username of the `Member`, if any.
        pub fn username(&self) -> Option<api::member::Username> {
            self.0.username.clone().map(Into::into)
        }

        /// Age of the `Member` in years.
        pub fn age(&self) -> i32 {
            self.0.age.into()
        }

        /// ID of the `Team` the `Member` belongs to, if any.
        pub fn team_id(&self) -> Option<api::team::Id> {
            self.0.team_id.map(Into::into)
        }

        /// Name of the `Team` the `Member` belongs to, if any.
        pub fn team_name(&self) -> Option<api::team::Name> {
            self.0.team_name.clone().map(Into::into)
        }
    }

    impl From<search::MemberTeam> for MemberTeam {
        fn from(row: search::MemberTeam) -> Self {
            Self(row)
        }
    }

    /// Page of `MemberTeam`s, either counted or counting on demand.
    #[derive(Debug)]
    pub enum Page {
        /// Page with an already known total count.
        Counted(search::Page),

        /// Page counting its total on the first request.
        Lazy(LazyPage<Postgres>),
    }

    impl From<search::Page> for Page {
        fn from(page: search::Page) -> Self {
            Self::Counted(page)
        }
    }

    impl From<LazyPage<Postgres>> for Page {
        fn from(page: LazyPage<Postgres>) -> Self {
            Self::Lazy(page)
        }
    }

    impl Page {
        /// Returns [`search::Pageable`] of this [`Page`].
        fn pageable(&self) -> search::Pageable {
            match self {
                Self::Counted(page) => page.pageable(),
                Self::Lazy(page) => page.pageable(),
            }
        }

        /// Returns total count of this [`Page`], counting it if necessary.
        async fn total(&self, ctx: &Context) -> Result<u64, Error> {
            match self {
                Self::Counted(page) => Ok(page.total()),
                Self::Lazy(page) => page
                    .total()
                    .await
                    .map_err(AsError::into_error)
                    .map_err(ctx.error()),
            }
        }
    }

    /// Converts the provided count into a GraphQL `Int`.
    fn int(count: u64) -> Result<i32, Error> {
        i32::try_from(count).map_err(AsError::into_error)
    }

    /// Page of `MemberTeam`s.
    #[graphql_object(name = "MemberTeamPage", context = Context)]
    impl Page {
        /// `MemberTeam`s on this page.
        pub fn content(&self) -> Vec<MemberTeam> {
            let content = match self {
                Self::Counted(page) => page.content(),
                Self::Lazy(page) => page.content(),
            };
            content.iter().cloned().map(Into::into).collect()
        }

        /// Total number of `MemberTeam`s across all pages.
        #[tracing::instrument(
            skip_all,
            fields(
                gql.name = "MemberTeamPage.totalCount",
                otel.name = api::Query::SPAN_NAME,
            ),
        )]
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            int(self.total(ctx).await?)
        }

        /// Number of `MemberTeam`s skipped before this page.
        pub fn offset(&self) -> Result<i32, Error> {
            int(self.pageable().offset())
        }

        /// Maximum number of `MemberTeam`s on this page.
        pub fn size(&self) -> Result<i32, Error> {
            int(self.pageable().size())
        }

        /// Total number of pages.
        pub async fn total_pages(&self, ctx: &Context) -> Result<i32, Error> {
            let size = self.pageable().size();
            int(self.total(ctx).await?.div_ceil(size))
        }

        /// Indicates whether there are `MemberTeam`s after this page.
        pub async fn has_next(&self, ctx: &Context) -> Result<bool, Error> {
            let pageable = self.pageable();
            Ok(pageable.offset().saturating_add(pageable.size())
                < self.total(ctx).await?)
        }
    }

    define_error! {
        enum ArgumentsError {
            #[code = "INVALID_SEARCH_CONDITION"]
            #[status = BAD_REQUEST]
            #[message = "Search condition contains invalid values"]
            InvalidCondition,

            #[code = "INVALID_PAGE_SIZE"]
            #[status = BAD_REQUEST]
            #[message = "Page size must be positive"]
            InvalidPageSize,

            #[code = "INVALID_OFFSET"]
            #[status = BAD_REQUEST]
            #[message = "Offset must not be negative"]
            InvalidOffset,
        }
    }

    #[cfg(test)]
    mod spec {
        use service::{
            domain::{member, team},
            read::member::search,
        };

        use super::{ArgumentsError, Condition};

        #[test]
        fn treats_empty_strings_as_absent() {
            let condition = search::Condition::try_from(Condition {
                username: Some(String::new()),
                team_name: Some(String::new()),
                ..Condition::default()
            })
            .unwrap();

            assert_eq!(condition, search::Condition::default());
        }

        #[test]
        fn converts_present_fields() {
            let condition = search::Condition::try_from(Condition {
                username: None,
                team_name: Some("teamA".to_owned()),
                age_goe: Some(20),
                age_loe: None,
            })
            .unwrap();

            assert_eq!(
                condition,
                search::Condition {
                    team_name: team::Name::new("teamA"),
                    age_goe: member::Age::new(20),
                    ..search::Condition::default()
                },
            );
        }

        #[test]
        fn rejects_invalid_values() {
            let negative_age = search::Condition::try_from(Condition {
                age_loe: Some(-1),
                ..Condition::default()
            });
            assert!(matches!(
                negative_age,
                Err(ArgumentsError::InvalidCondition),
            ));

            let padded_name = search::Condition::try_from(Condition {
                team_name: Some(" teamA ".to_owned()),
                ..Condition::default()
            });
            assert!(matches!(
                padded_name,
                Err(ArgumentsError::InvalidCondition),
            ));
        }
    }
}
