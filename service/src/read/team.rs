//! [`Team`] read model definitions.
//!
//! [`Team`]: crate::domain::Team

use crate::domain::team;

/// Average age of [`Member`]s of a [`Team`].
///
/// [`Member`]: crate::domain::Member
/// [`Team`]: crate::domain::Team
#[derive(Clone, Debug, PartialEq)]
pub struct AverageAge {
    /// [`team::Name`] the average is grouped by.
    pub team_name: team::Name,

    /// Average age of the [`Team`]'s [`Member`]s.
    ///
    /// [`Member`]: crate::domain::Member
    /// [`Team`]: crate::domain::Team
    pub average_age: f64,
}
