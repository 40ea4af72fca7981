//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, domain::member, Command as _};

use crate::{api, api::query::MemberError, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

/// Parses the provided `years` as a [`member::Age`].
fn age(years: i32) -> Result<member::Age, Error> {
    member::Age::new(years).ok_or_else(|| MemberError::InvalidAge.into())
}

/// Converts the provided number of affected rows into a GraphQL integer.
fn affected(rows: u64) -> Result<i32, Error> {
    i32::try_from(rows).map_err(AsError::into_error)
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `Team` with the provided `name`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createTeam",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_team(
        name: api::team::Name,
        ctx: &Context,
    ) -> Result<api::Team, Error> {
        ctx.service()
            .execute(command::CreateTeam { name: name.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Member`, optionally belonging to the `Team` with the
    /// provided `teamId`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_AGE` - the `age` is negative;
    /// - `TEAM_NOT_EXISTS` - the `Team` with the provided `teamId` does not
    ///                       exist.
    #[tracing::instrument(
        skip_all,
        fields(
            age = %age,
            gql.name = "createMember",
            otel.name = Self::SPAN_NAME,
            team_id = ?team_id,
            username = ?username,
        ),
    )]
    pub async fn create_member(
        username: Option<api::member::Username>,
        age: i32,
        team_id: Option<api::team::Id>,
        ctx: &Context,
    ) -> Result<api::Member, Error> {
        let age = self::age(age).map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateMember {
                username: username.map(Into::into),
                age,
                team_id: team_id.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Sets the provided `username` to all the `Member`s younger than
    /// `youngerThan`.
    ///
    /// Returns the number of renamed `Member`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_AGE` - the `youngerThan` is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "renameMembers",
            otel.name = Self::SPAN_NAME,
            username = %username,
            younger_than = %younger_than,
        ),
    )]
    pub async fn rename_members(
        username: api::member::Username,
        younger_than: i32,
        ctx: &Context,
    ) -> Result<i32, Error> {
        let younger_than = age(younger_than).map_err(ctx.error())?;

        let renamed = ctx
            .service()
            .execute(command::RenameMembers {
                username: username.into(),
                younger_than,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        affected(renamed).map_err(ctx.error())
    }

    /// Adds the provided `delta` to ages of all the `Member`s.
    ///
    /// Returns the number of updated `Member`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_AGE` - the `delta` moves some `Member`'s age below zero or
    ///                   out of the `Int` range.
    #[tracing::instrument(
        skip_all,
        fields(
            delta = %delta,
            gql.name = "addMembersAge",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn add_members_age(
        delta: i32,
        ctx: &Context,
    ) -> Result<i32, Error> {
        let updated = ctx
            .service()
            .execute(command::AddMembersAge { delta })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        affected(updated).map_err(ctx.error())
    }

    /// Deletes all the `Member`s older than `olderThan`.
    ///
    /// Returns the number of deleted `Member`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_AGE` - the `olderThan` is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteMembers",
            older_than = %older_than,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_members(
        older_than: i32,
        ctx: &Context,
    ) -> Result<i32, Error> {
        let older_than = age(older_than).map_err(ctx.error())?;

        let deleted = ctx
            .service()
            .execute(command::DeleteMembers { older_than })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        affected(deleted).map_err(ctx.error())
    }
}
