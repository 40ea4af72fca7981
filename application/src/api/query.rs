//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{
    domain::member,
    query,
    read::{self, member::search},
    Query as _,
};

use crate::{
    api::{self, member::search as api_search},
    define_error, AsError, Context, Error,
};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Searches a page of `MemberTeam`s satisfying the provided `condition`.
    ///
    /// `size` defaults to the configured page size, `offset` defaults to `0`.
    /// `MemberTeam`s are ordered by `sort` keys, and then by creation order.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_SEARCH_CONDITION` - the `condition` contains invalid values;
    /// - `INVALID_OFFSET` - the `offset` is negative;
    /// - `INVALID_PAGE_SIZE` - the `size` isn't positive or exceeds the
    ///                         configured maximum.
    #[tracing::instrument(
        skip_all,
        fields(
            condition = ?condition,
            gql.name = "searchMembers",
            offset = ?offset,
            otel.name = Self::SPAN_NAME,
            size = ?size,
            strategy = ?strategy,
        ),
    )]
    pub async fn search_members(
        condition: Option<api_search::Condition>,
        offset: Option<i32>,
        size: Option<i32>,
        sort: Option<Vec<api_search::Sort>>,
        strategy: Option<api_search::Strategy>,
        ctx: &Context,
    ) -> Result<api_search::Page, Error> {
        use api_search::{ArgumentsError as E, Strategy};

        let condition = search::Condition::try_from(
            condition.unwrap_or_default(),
        )
        .map_err(Error::from)
        .map_err(ctx.error())?;
        let offset = u64::try_from(offset.unwrap_or(0))
            .map_err(|_| E::InvalidOffset.into())
            .map_err(ctx.error())?;
        let size = match size {
            Some(s) => u64::try_from(s)
                .map_err(|_| E::InvalidPageSize.into())
                .map_err(ctx.error())?,
            None => ctx.service().config().default_page_size,
        };
        let pageable = search::Pageable::new(offset, size)
            .ok_or_else(|| E::InvalidPageSize.into())
            .map_err(ctx.error())?;

        let selector = search::Selector {
            condition,
            pageable,
            sort: sort.into_iter().flatten().map(Into::into).collect(),
        };
        let svc = ctx.service();
        let page = match strategy.unwrap_or_default() {
            Strategy::Simple => svc
                .execute(query::members::SearchPageSimple(selector))
                .await
                .map(api_search::Page::from),
            Strategy::Complex => svc
                .execute(query::members::SearchPageComplex(selector))
                .await
                .map(api_search::Page::from),
            Strategy::Deferred => svc
                .execute(query::members::SearchPageDeferred(selector))
                .await
                .map(api_search::Page::from),
            Strategy::Optimized => svc
                .execute(query::members::SearchPageOptimized(selector))
                .await
                .map(api_search::Page::from),
        };
        page.map_err(AsError::into_error).map_err(ctx.error())
    }

    /// Searches all the `MemberTeam`s satisfying the provided `condition`,
    /// in creation order.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_SEARCH_CONDITION` - the `condition` contains invalid values.
    #[tracing::instrument(
        skip_all,
        fields(
            condition = ?condition,
            gql.name = "searchAllMembers",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn search_all_members(
        condition: Option<api_search::Condition>,
        ctx: &Context,
    ) -> Result<Vec<api_search::MemberTeam>, Error> {
        let condition = search::Condition::try_from(
            condition.unwrap_or_default(),
        )
        .map_err(Error::from)
        .map_err(ctx.error())?;

        ctx.service()
            .execute(query::members::Search::by(condition))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rows| rows.into_iter().map(Into::into).collect())
    }

    /// Counts the `Member`s satisfying the provided `condition`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_SEARCH_CONDITION` - the `condition` contains invalid values.
    #[tracing::instrument(
        skip_all,
        fields(
            condition = ?condition,
            gql.name = "countMembers",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn count_members(
        condition: Option<api_search::Condition>,
        ctx: &Context,
    ) -> Result<i32, Error> {
        let condition = search::Condition::try_from(
            condition.unwrap_or_default(),
        )
        .map_err(Error::from)
        .map_err(ctx.error())?;

        let count = ctx
            .service()
            .execute(query::members::TotalCount::by(condition))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        i32::try_from(u64::from(count))
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Lists `Member`s of the provided `age` (if any), ordered by `sort` keys
    /// and then by creation order, without counting them.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_AGE` - the `age` is negative;
    /// - `INVALID_OFFSET` - the `offset` or the `limit` is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            age = ?age,
            gql.name = "members",
            limit = ?limit,
            offset = ?offset,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn members(
        age: Option<i32>,
        sort: Option<Vec<api_search::Sort>>,
        offset: Option<i32>,
        limit: Option<i32>,
        ctx: &Context,
    ) -> Result<Vec<api::Member>, Error> {
        use api_search::ArgumentsError as E;

        let age = age
            .map(|a| member::Age::new(a).ok_or(MemberError::InvalidAge))
            .transpose()
            .map_err(Error::from)
            .map_err(ctx.error())?;
        let offset = u64::try_from(offset.unwrap_or(0))
            .map_err(|_| E::InvalidOffset.into())
            .map_err(ctx.error())?;
        let limit = limit
            .map(u64::try_from)
            .transpose()
            .map_err(|_| E::InvalidOffset.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::members::List::by(read::member::list::Selector {
                age,
                sort: sort.into_iter().flatten().map(Into::into).collect(),
                offset,
                limit,
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ms| ms.into_iter().map(Into::into).collect())
    }

    /// Lists `Member`s of the `Team`s with the provided `name`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "teamMembers",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn team_members(
        name: api::team::Name,
        ctx: &Context,
    ) -> Result<Vec<api::Member>, Error> {
        ctx.service()
            .execute(query::members::OfTeam::by(name.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ms| ms.into_iter().map(Into::into).collect())
    }

    /// Lists `Member`s whose username equals to a name of some `Team`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "teamNamesakes",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn team_namesakes(
        ctx: &Context,
    ) -> Result<Vec<api::Member>, Error> {
        ctx.service()
            .execute(query::members::NamesakesOfTeams::by(
                read::member::NamesakesOfTeams,
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ms| ms.into_iter().map(Into::into).collect())
    }

    /// Lists all the `Member`s along with the joined `Team`s.
    ///
    /// If `teamName` is provided, the `Team` a `Member` belongs to is joined
    /// only if it has this name. Otherwise, any `Team` named the same as a
    /// `Member`'s username is joined.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "membersWithTeams",
            otel.name = Self::SPAN_NAME,
            team_name = ?team_name.as_ref().map(ToString::to_string),
        ),
    )]
    pub async fn members_with_teams(
        team_name: Option<api::team::Name>,
        ctx: &Context,
    ) -> Result<Vec<api::member::WithTeam>, Error> {
        let join = team_name.map_or(read::member::TeamJoin::Namesake, |n| {
            read::member::TeamJoin::Named(n.into())
        });

        ctx.service()
            .execute(query::members::WithTeams::by(join))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ms| ms.into_iter().map(Into::into).collect())
    }

    /// Returns the earliest created `Member` with the provided `username`,
    /// along with its `Team`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `MEMBER_NOT_EXISTS` - no `Member` has the provided `username`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "member",
            otel.name = Self::SPAN_NAME,
            username = %username,
        ),
    )]
    pub async fn member(
        username: api::member::Username,
        ctx: &Context,
    ) -> Result<api::member::WithTeam, Error> {
        ctx.service()
            .execute(query::member::ByUsername::by(username.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| MemberError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns aggregated statistics over ages of all the `Member`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "memberStats",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn member_stats(
        ctx: &Context,
    ) -> Result<api::member::Stats, Error> {
        ctx.service()
            .execute(query::members::Stats::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Team` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `TEAM_NOT_EXISTS` - the `Team` with the provided ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "team",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn team(
        id: api::team::Id,
        ctx: &Context,
    ) -> Result<api::Team, Error> {
        ctx.service()
            .execute(query::team::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| TeamError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns average ages of `Member`s grouped by names of their `Team`s,
    /// ordered by the names.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "teamAverageAges",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn team_average_ages(
        ctx: &Context,
    ) -> Result<Vec<api::team::AverageAge>, Error> {
        ctx.service()
            .execute(query::teams::AverageAges::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|avgs| avgs.into_iter().map(Into::into).collect())
    }
}

define_error! {
    enum MemberError {
        #[code = "MEMBER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Member` with the provided username does not exist"]
        NotExists,

        #[code = "INVALID_AGE"]
        #[status = BAD_REQUEST]
        #[message = "Age must not be negative"]
        InvalidAge,
    }
}

define_error! {
    enum TeamError {
        #[code = "TEAM_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Team` with the provided ID does not exist"]
        NotExists,
    }
}
