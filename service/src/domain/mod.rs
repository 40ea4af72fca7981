//! Domain definitions.

pub mod member;
pub mod team;

pub use self::{member::Member, team::Team};
