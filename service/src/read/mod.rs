//! Read entities definitions.

pub mod member;
pub mod team;

pub use self::member::{search::MemberTeam, WithTeam};
