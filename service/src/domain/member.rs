//! [`Member`] definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::team;
#[cfg(doc)]
use crate::domain::Team;

/// Member of a [`Team`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Member {
    /// ID of this [`Member`].
    pub id: Id,

    /// [`Username`] of this [`Member`], if any.
    pub username: Option<Username>,

    /// [`Age`] of this [`Member`].
    pub age: Age,

    /// ID of the [`Team`] this [`Member`] belongs to, if any.
    pub team_id: Option<team::Id>,
}

/// ID of a [`Member`].
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

/// Username of a [`Member`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Username(String);

impl Username {
    /// Creates a new [`Username`] if the given `username` is valid.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Option<Self> {
        let username = username.into();
        Self::check(&username).then_some(Self(username))
    }

    /// Checks whether the given `username` is a valid [`Username`].
    fn check(username: impl AsRef<str>) -> bool {
        let username = username.as_ref();
        username.trim() == username
            && !username.is_empty()
            && username.len() <= 255
    }
}

impl FromStr for Username {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Username`")
    }
}

/// Age of a [`Member`] in years.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Age(i32);

impl Age {
    /// Creates a new [`Age`] if the given `years` is not negative.
    #[must_use]
    pub fn new(years: i32) -> Option<Self> {
        (years >= 0).then_some(Self(years))
    }
}

impl TryFrom<i32> for Age {
    type Error = &'static str;

    fn try_from(years: i32) -> Result<Self, Self::Error> {
        Self::new(years).ok_or("negative `Age`")
    }
}

impl FromStr for Age {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i32>()
            .map_err(|_| "invalid `Age`")?
            .try_into()
    }
}

pub mod bulk {
    //! Bulk operations over multiple [`Member`]s at once.
    //!
    //! [`Member`]: super::Member

    use super::{Age, Username};

    /// Renames all the [`Member`]s younger than the specified [`Age`].
    ///
    /// [`Member`]: super::Member
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Rename {
        /// New [`Username`] to assign.
        pub username: Username,

        /// Exclusive upper bound of [`Age`] of the renamed [`Member`]s.
        ///
        /// [`Member`]: super::Member
        pub younger_than: Age,
    }

    /// Adds the specified number of years to the [`Age`] of all [`Member`]s.
    ///
    /// [`Member`]: super::Member
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct AddAge(pub i32);

    /// Selects all [`Member`]s older than the specified [`Age`].
    ///
    /// [`Member`]: super::Member
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct OlderThan(pub Age);
}

#[cfg(test)]
mod spec {
    use super::{Age, Id, Username};

    #[test]
    fn validates_username() {
        assert!(Username::new("member1").is_some());
        assert_eq!(
            "member1"
                .parse::<Username>()
                .ok()
                .as_ref()
                .map(AsRef::<str>::as_ref),
            Some("member1"),
        );
        assert!(" member1".parse::<Username>().is_err());

        assert!(Username::new("").is_none());
        assert!(Username::new("  ").is_none());
        assert!(Username::new(" member1").is_none());
    }

    #[test]
    fn validates_age() {
        assert_eq!("10".parse::<Age>().map(i32::from), Ok(10));
        assert_eq!(Age::new(0).map(i32::from), Some(0));

        assert!(Age::new(-1).is_none());
        assert!("-5".parse::<Age>().is_err());
        assert!("ten".parse::<Age>().is_err());
    }

    #[test]
    fn parses_id() {
        let id = Id::new();

        assert_eq!(id.to_string().parse::<Id>().ok(), Some(id));
        assert!("member1".parse::<Id>().is_err());
    }
}
