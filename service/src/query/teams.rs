//! [`Query`] collection related to the multiple [`Team`]s.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::Team, Query};

use super::DatabaseQuery;

/// Queries average ages of [`Member`]s grouped by names of their [`Team`]s,
/// ordered by [`Team`] names.
///
/// [`Member`]: crate::domain::Member
pub type AverageAges = DatabaseQuery<By<Vec<read::team::AverageAge>, ()>>;
