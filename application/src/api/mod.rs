//! GraphQL API definitions.

pub mod member;
mod mutation;
mod query;
pub mod scalar;
pub mod team;

use juniper::EmptySubscription;

use crate::Context;

pub use self::{
    member::Member, mutation::Mutation, query::Query, team::Team,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Creates a new [`Schema`].
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}
