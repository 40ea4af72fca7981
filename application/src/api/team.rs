//! [`Team`]-related definitions.

use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, read};
use uuid::Uuid;

use crate::{api, api::scalar, Context};

/// A team of members.
#[derive(Clone, Debug, From)]
pub struct Team(domain::Team);

/// A team of members.
#[graphql_object(context = Context)]
impl Team {
    /// Unique identifier of this `Team`.
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Name of this `Team`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Team.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }
}

/// Unique identifier of a `Team`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::team::Id)]
#[into(domain::team::Id)]
#[graphql(name = "TeamId", transparent)]
pub struct Id(Uuid);

/// Name of a `Team`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "TeamName",
    with = scalar::Validated::<domain::team::Name>,
)]
pub struct Name(domain::team::Name);

/// Average age of the members of the `Team`s having the same name.
#[derive(Clone, Debug, From)]
pub struct AverageAge(read::team::AverageAge);

/// Average age of the members of the `Team`s having the same name.
#[graphql_object(name = "TeamAverageAge", context = Context)]
impl AverageAge {
    /// Name of the `Team`s.
    pub fn team_name(&self) -> Name {
        self.0.team_name.clone().into()
    }

    /// Average age of the `Team`s' members.
    pub fn average_age(&self) -> f64 {
        self.0.average_age
    }
}
