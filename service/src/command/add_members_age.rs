//! [`Command`] for adding years to all the [`Member`]s in bulk.

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{member, Member};
use crate::{
    domain::member::bulk,
    infra::{database, Database},
    read::member::Stats,
    Service,
};

use super::Command;

/// [`Command`] for adding the specified number of years to the
/// [`member::Age`] of every [`Member`].
#[derive(Clone, Copy, Debug)]
pub struct AddMembersAge {
    /// Number of years to add, may be negative.
    pub delta: i32,
}

impl<Db> Command<AddMembersAge> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Stats, ()>>,
            Ok = Stats,
            Err = Traced<database::Error>,
        > + Database<
            Update<bulk::AddAge>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    /// Number of updated [`Member`]s.
    type Ok = u64;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        AddMembersAge { delta }: AddMembersAge,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let stats = tx
            .execute(Select(By::<Stats, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let in_range = |age: Option<i32>| {
            age.map_or(true, |a| a.checked_add(delta).is_some_and(|a| a >= 0))
        };
        if !in_range(stats.min) || !in_range(stats.max) {
            return Err(tracerr::new!(E::AgeOutOfRange(delta)));
        }

        let updated = tx.execute(Update(bulk::AddAge(delta))).await;
        if let Err(e) = &updated {
            // `Member`s may be inserted concurrently.
            if e.as_ref().is_check_violation() {
                return Err(tracerr::new!(E::AgeOutOfRange(delta)));
            }
        }
        let updated = updated.map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(updated)
    }
}

/// Error of [`AddMembersAge`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Adding the years moves some [`member::Age`] out of its range.
    #[display("Adding `{_0}` years moves some `Member`'s age out of range")]
    #[from(ignore)]
    AgeOutOfRange(#[error(not(source))] i32),
}

#[cfg(test)]
mod spec {
    use std::sync::{Arc, Mutex};

    use common::operations::{By, Commit, Select, Transact, Update};
    use tracerr::Traced;

    use crate::{
        domain::member::bulk,
        infra::{database, Database},
        read::member::Stats,
        Config, Service,
    };

    use super::{AddMembersAge, ExecutionError};

    #[derive(Clone, Debug, Default)]
    struct MockDb {
        ages: Arc<Mutex<Vec<i32>>>,
        committed: Arc<Mutex<bool>>,
    }

    impl Database<Transact> for MockDb {
        type Ok = Self;
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
            Ok(self.clone())
        }
    }

    impl Database<Select<By<Stats, ()>>> for MockDb {
        type Ok = Stats;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Select<By<Stats, ()>>,
        ) -> Result<Self::Ok, Self::Err> {
            let ages = self.ages.lock().unwrap();
            Ok(Stats {
                count: u64::try_from(ages.len()).unwrap(),
                sum: None,
                avg: None,
                max: ages.iter().copied().max(),
                min: ages.iter().copied().min(),
            })
        }
    }

    impl Database<Update<bulk::AddAge>> for MockDb {
        type Ok = u64;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Update(bulk::AddAge(delta)): Update<bulk::AddAge>,
        ) -> Result<Self::Ok, Self::Err> {
            let mut ages = self.ages.lock().unwrap();
            for age in ages.iter_mut() {
                *age += delta;
            }
            Ok(u64::try_from(ages.len()).unwrap())
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

    fn service(ages: Vec<i32>) -> Service<MockDb> {
        let db = MockDb {
            ages: Arc::new(Mutex::new(ages)),
            ..MockDb::default()
        };
        Service::new(Config::default(), db)
    }

    #[tokio::test]
    async fn adds_years_to_every_member() {
        let svc = service(vec![10, 20, 30]);

        let updated = svc.execute(AddMembersAge { delta: -10 }).await.unwrap();

        assert_eq!(updated, 3);
        assert_eq!(*svc.database().ages.lock().unwrap(), [0, 10, 20]);
        assert!(*svc.database().committed.lock().unwrap());
    }

    #[tokio::test]
    async fn updates_nothing_without_members() {
        let svc = service(vec![]);

        let updated = svc.execute(AddMembersAge { delta: -10 }).await.unwrap();

        assert_eq!(updated, 0);
    }

    #[tokio::test]
    async fn rejects_negative_resulting_age() {
        let svc = service(vec![10, 20, 30]);

        let err = svc
            .execute(AddMembersAge { delta: -11 })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::AgeOutOfRange(-11)));
        assert_eq!(*svc.database().ages.lock().unwrap(), [10, 20, 30]);
        assert!(!*svc.database().committed.lock().unwrap());
    }

    #[tokio::test]
    async fn rejects_overflowing_age() {
        let svc = service(vec![10, 20]);

        let err = svc
            .execute(AddMembersAge { delta: i32::MAX })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::AgeOutOfRange(_)));
        assert_eq!(*svc.database().ages.lock().unwrap(), [10, 20]);
    }
}
