//! [`Command`] for renaming [`Member`]s in bulk.

use common::operations::Update;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Member;
use crate::{
    domain::member::{self, bulk},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for assigning the same [`member::Username`] to all the
/// [`Member`]s younger than the specified [`member::Age`].
#[derive(Clone, Debug)]
pub struct RenameMembers {
    /// New [`member::Username`] to assign.
    pub username: member::Username,

    /// Exclusive upper bound of [`member::Age`] of the renamed [`Member`]s.
    pub younger_than: member::Age,
}

impl<Db> Command<RenameMembers> for Service<Db>
where
    Db: Database<
        Update<bulk::Rename>,
        Ok = u64,
        Err = Traced<database::Error>,
    >,
{
    /// Number of renamed [`Member`]s.
    type Ok = u64;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RenameMembers,
    ) -> Result<Self::Ok, Self::Err> {
        let RenameMembers {
            username,
            younger_than,
        } = cmd;

        self.database()
            .execute(Update(bulk::Rename {
                username,
                younger_than,
            }))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`RenameMembers`] [`Command`] execution.
pub type ExecutionError = database::Error;
