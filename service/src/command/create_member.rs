//! [`Command`] for creating a new [`Member`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{member, team, Member, Team},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Member`].
#[derive(Clone, Debug)]
pub struct CreateMember {
    /// [`member::Username`] of a new [`Member`], if any.
    pub username: Option<member::Username>,

    /// [`member::Age`] of a new [`Member`].
    pub age: member::Age,

    /// ID of the [`Team`] a new [`Member`] joins, if any.
    pub team_id: Option<team::Id>,
}

impl<Db> Command<CreateMember> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Team>, team::Id>>,
            Ok = Option<Team>,
            Err = Traced<database::Error>,
        > + Database<Insert<Member>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Member;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateMember,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateMember {
            username,
            age,
            team_id,
        } = cmd;

        let member = Member {
            id: member::Id::new(),
            username,
            age,
            team_id,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if let Some(team_id) = team_id {
            tx.execute(Select(By::<Option<Team>, _>::new(team_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::TeamNotExists(team_id))
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }

        let inserted = tx.execute(Insert(member.clone())).await;
        if let (Err(e), Some(id)) = (&inserted, team_id) {
            // `Team` may be removed concurrently.
            if e.as_ref().is_foreign_key_violation(None) {
                return Err(tracerr::new!(E::TeamNotExists(id)));
            }
        }
        inserted.map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(member)
    }
}

/// Error of [`CreateMember`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Team`] doesn't exist.
    #[display("`Team(id: {_0})` does not exist")]
    #[from(ignore)]
    TeamNotExists(#[error(not(source))] team::Id),
}

#[cfg(test)]
mod spec {
    use std::sync::{Arc, Mutex};

    use common::operations::{By, Commit, Insert, Select, Transact};
    use tracerr::Traced;

    use crate::{
        domain::{member, team, Member, Team},
        infra::{database, Database},
        Config, Service,
    };

    use super::{CreateMember, ExecutionError};

    #[derive(Clone, Debug, Default)]
    struct MockDb {
        teams: Arc<Vec<Team>>,
        members: Arc<Mutex<Vec<Member>>>,
        committed: Arc<Mutex<bool>>,
    }

    impl Database<Transact> for MockDb {
        type Ok = Self;
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
            Ok(self.clone())
        }
    }

    impl Database<Select<By<Option<Team>, team::Id>>> for MockDb {
        type Ok = Option<Team>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<Team>, team::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            Ok(self.teams.iter().find(|t| t.id == id).cloned())
        }
    }

    impl Database<Insert<Member>> for MockDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Insert(member): Insert<Member>,
        ) -> Result<Self::Ok, Self::Err> {
            self.members.lock().unwrap().push(member);
            Ok(())
        }
    }

    impl Database<Commit> for MockDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
            *self.committed.lock().unwrap() = true;
            Ok(())
        }
    }

    fn service() -> (Service<MockDb>, Team) {
        let team = Team {
            id: team::Id::new(),
            name: team::Name::new("teamA").unwrap(),
        };
        let db = MockDb {
            teams: Arc::new(vec![team.clone()]),
            ..MockDb::default()
        };
        (Service::new(Config::default(), db), team)
    }

    #[tokio::test]
    async fn creates_member_of_existing_team() {
        let (svc, team) = service();

        let member = svc
            .execute(CreateMember {
                username: member::Username::new("member1"),
                age: member::Age::new(10).unwrap(),
                team_id: Some(team.id),
            })
            .await
            .unwrap();

        assert_eq!(member.team_id, Some(team.id));
        assert_eq!(*svc.database().members.lock().unwrap(), [member]);
        assert!(*svc.database().committed.lock().unwrap());
    }

    #[tokio::test]
    async fn creates_member_without_team() {
        let (svc, _) = service();

        let member = svc
            .execute(CreateMember {
                username: None,
                age: member::Age::new(0).unwrap(),
                team_id: None,
            })
            .await
            .unwrap();

        assert_eq!(member.username, None);
        assert_eq!(svc.database().members.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_unknown_team() {
        let (svc, _) = service();
        let unknown = team::Id::new();

        let err = svc
            .execute(CreateMember {
                username: member::Username::new("member1"),
                age: member::Age::new(10).unwrap(),
                team_id: Some(unknown),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::TeamNotExists(id) if *id == unknown,
        ));
        assert!(svc.database().members.lock().unwrap().is_empty());
        assert!(!*svc.database().committed.lock().unwrap());
    }
}
