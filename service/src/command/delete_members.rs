//! [`Command`] for deleting [`Member`]s in bulk.

use common::operations::Delete;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Member;
use crate::{
    domain::member::{self, bulk},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting all the [`Member`]s older than the specified
/// [`member::Age`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteMembers {
    /// Exclusive lower bound of [`member::Age`] of the deleted [`Member`]s.
    pub older_than: member::Age,
}

impl<Db> Command<DeleteMembers> for Service<Db>
where
    Db: Database<
        Delete<bulk::OlderThan>,
        Ok = u64,
        Err = Traced<database::Error>,
    >,
{
    /// Number of deleted [`Member`]s.
    type Ok = u64;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        DeleteMembers { older_than }: DeleteMembers,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Delete(bulk::OlderThan(older_than)))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`DeleteMembers`] [`Command`] execution.
pub type ExecutionError = database::Error;
