//! [`Team`] definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

/// Team that [`Member`]s belong to.
///
/// [`Member`]: crate::domain::Member
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Team {
    /// ID of this [`Team`].
    pub id: Id,

    /// [`Name`] of this [`Team`].
    pub name: Name,
}

/// ID of a [`Team`].
#[derive(
    Clone, Copy, Debug, Display, Eq, From, FromStr, Hash, Into, Ord, PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new time-ordered [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

/// Name of a [`Team`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 255
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

#[cfg(test)]
mod spec {
    use super::{Id, Name};

    #[test]
    fn validates_name() {
        assert!(Name::new("teamA").is_some());

        assert!(Name::new("").is_none());
        assert!(Name::new(" teamA").is_none());
        assert!(Name::new("teamA ").is_none());
        assert!(Name::new("a".repeat(256)).is_none());

        assert!("teamA".parse::<Name>().is_ok());
        assert!("teamA ".parse::<Name>().is_err());
    }

    #[test]
    fn ids_follow_creation_order() {
        let first = Id::new();
        let second = Id::new();

        assert!(first < second);
    }
}
