//! [`Command`] definition.

pub mod add_members_age;
pub mod create_member;
pub mod create_team;
pub mod delete_members;
pub mod rename_members;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_members_age::AddMembersAge, create_member::CreateMember,
    create_team::CreateTeam, delete_members::DeleteMembers,
    rename_members::RenameMembers,
};
