//! [`Command`] for creating a new [`Team`].

use common::operations::Insert;
use tracerr::Traced;

use crate::{
    domain::{team, Team},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Team`].
#[derive(Clone, Debug)]
pub struct CreateTeam {
    /// [`team::Name`] of a new [`Team`].
    pub name: team::Name,
}

impl<Db> Command<CreateTeam> for Service<Db>
where
    Db: Database<Insert<Team>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Team;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateTeam) -> Result<Self::Ok, Self::Err> {
        let CreateTeam { name } = cmd;

        let team = Team {
            id: team::Id::new(),
            name,
        };
        self.database()
            .execute(Insert(team.clone()))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(team)
    }
}

/// Error of [`CreateTeam`] [`Command`] execution.
pub type ExecutionError = database::Error;
