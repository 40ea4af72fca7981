//! [`Query`] collection related to a single [`Team`].

use common::operations::By;

use crate::domain::{team, Team};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Team`] by its [`team::Id`].
pub type ById = DatabaseQuery<By<Option<Team>, team::Id>>;
