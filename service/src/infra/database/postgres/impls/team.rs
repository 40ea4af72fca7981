//! [`Team`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{team, Team},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Select<By<Option<Team>, team::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Team>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Team>, team::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: team::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name \
            FROM teams \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Team {
                id: row.get("id"),
                name: row.get("name"),
            }))
    }
}

impl<C> Database<Insert<Team>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(team): Insert<Team>,
    ) -> Result<Self::Ok, Self::Err> {
        let Team { id, name } = team;

        const SQL: &str = "\
            INSERT INTO teams (id, name) \
            VALUES ($1::UUID, $2::VARCHAR)";
        self.exec(SQL, &[&id, &name])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<read::team::AverageAge>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::team::AverageAge>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<read::team::AverageAge>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT t.name AS team_name, \
                   AVG(m.age)::FLOAT8 AS average_age \
            FROM members AS m \
            INNER JOIN teams AS t ON t.id = m.team_id \
            GROUP BY t.name \
            ORDER BY t.name";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| read::team::AverageAge {
                team_name: row.get("team_name"),
                average_age: row.get("average_age"),
            })
            .collect())
    }
}
