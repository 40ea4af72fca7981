//! [`Query`] collection related to a single [`Member`].

use common::operations::By;

use crate::{domain::member, read};
#[cfg(doc)]
use crate::{domain::Member, Query};

use super::DatabaseQuery;

/// Queries a [`Member`] by its [`member::Username`], fetching its [`Team`]
/// along.
///
/// The earliest created [`Member`] is returned if there are several of them.
///
/// [`Team`]: crate::domain::Team
pub type ByUsername =
    DatabaseQuery<By<Option<read::WithTeam>, member::Username>>;
