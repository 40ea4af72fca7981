//! [`Member`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        member::{self, bulk},
        team, Member, Team,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::{
        self,
        member::{list, search, SortKey, TeamJoin},
    },
};

/// `SELECT` of [`search::MemberTeam`] projection columns, left-joining
/// [`Team`]s.
const MEMBER_TEAM: &str = "\
    SELECT m.id AS member_id, m.username, m.age, \
           t.id AS team_id, t.name AS team_name \
    FROM members AS m \
    LEFT JOIN teams AS t ON t.id = m.team_id";

/// `WHERE` clause rendered out of [`search::Condition`] predicates.
///
/// Only present predicates are rendered, each one binding its own parameter.
#[derive(Debug)]
struct Where<'a> {
    /// SQL of this clause.
    sql: String,

    /// Parameters bound by this clause, in order of their placeholders.
    params: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Where<'a> {
    /// Renders a new [`Where`] clause out of the provided
    /// [`search::Condition`].
    fn new(condition: &'a search::Condition) -> Self {
        let mut sql = String::from("WHERE true");
        let mut params: Vec<&'a (dyn ToSql + Sync)> = vec![];

        for predicate in condition.predicates() {
            let (column, op, ty) = match predicate {
                search::Predicate::UsernameEq(v) => {
                    params.push(v);
                    ("m.username", "=", "VARCHAR")
                }
                search::Predicate::TeamNameEq(v) => {
                    params.push(v);
                    ("t.name", "=", "VARCHAR")
                }
                search::Predicate::AgeGoe(v) => {
                    params.push(v);
                    ("m.age", ">=", "INT4")
                }
                search::Predicate::AgeLoe(v) => {
                    params.push(v);
                    ("m.age", "<=", "INT4")
                }
            };
            sql.push_str(&format!(
                " AND {column} {op} ${idx}::{ty}",
                idx = params.len(),
            ));
        }

        Self { sql, params }
    }

    /// Binds the provided `param` after the ones of this [`Where`] clause,
    /// returning its placeholder index.
    fn bind(&mut self, param: &'a (dyn ToSql + Sync)) -> usize {
        self.params.push(param);
        self.params.len()
    }
}

/// Renders `ORDER BY` items out of the provided [`list::Sort`]s, naming the
/// [`SortKey`]s with the provided `column` function.
///
/// Always ends with [`Member`]'s ID, so the order is total.
fn order_by(sort: &[list::Sort], column: fn(SortKey) -> &'static str) -> String {
    let items = sort.iter().format_with("", |s, f| {
        f(&format_args!(
            "{} {} {}, ",
            column(s.key),
            s.direction.sql(),
            s.nulls_placement().sql(),
        ))
    });
    format!("{items}{} ASC", column(SortKey::Id))
}

/// Names [`SortKey`]s as columns of the joined `members` and `teams` tables.
fn qualified(key: SortKey) -> &'static str {
    match key {
        SortKey::Id => "m.id",
        SortKey::Username => "m.username",
        SortKey::Age => "m.age",
        SortKey::TeamName => "t.name",
    }
}

/// Names [`SortKey`]s as columns of the [`MEMBER_TEAM`] projection.
fn projected(key: SortKey) -> &'static str {
    match key {
        SortKey::Id => "member_id",
        SortKey::Username => "username",
        SortKey::Age => "age",
        SortKey::TeamName => "team_name",
    }
}

/// Converts the provided [`common::Pageable`] into `LIMIT` and `OFFSET` values.
fn limit_offset(pageable: common::Pageable) -> (i64, i64) {
    (
        i64::try_from(pageable.size()).unwrap_or(i64::MAX),
        i64::try_from(pageable.offset()).unwrap_or(i64::MAX),
    )
}

/// Reads a [`search::MemberTeam`] out of the [`MEMBER_TEAM`] projection `row`.
fn member_team(row: &Row) -> search::MemberTeam {
    search::MemberTeam {
        member_id: row.get("member_id"),
        username: row.get("username"),
        age: row.get("age"),
        team_id: row.get("team_id"),
        team_name: row.get("team_name"),
    }
}

/// Reads a [`Member`] out of the `members` table `row`.
fn member(row: &Row) -> Member {
    Member {
        id: row.get("id"),
        username: row.get("username"),
        age: row.get("age"),
        team_id: row.get("team_id"),
    }
}

impl<C> Database<Insert<Member>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(member): Insert<Member>,
    ) -> Result<Self::Ok, Self::Err> {
        let Member {
            id,
            username,
            age,
            team_id,
        } = member;

        const SQL: &str = "\
            INSERT INTO members (id, username, age, team_id) \
            VALUES ($1::UUID, $2::VARCHAR, $3::INT4, $4::UUID)";
        self.exec(SQL, &[&id, &username, &age, &team_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<search::MemberTeam>, search::Condition>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<search::MemberTeam>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<search::MemberTeam>, search::Condition>>,
    ) -> Result<Self::Ok, Self::Err> {
        let condition = by.into_inner();
        let filter = Where::new(&condition);

        let sql = format!(
            "{MEMBER_TEAM} \
             {filter} \
             ORDER BY m.id ASC",
            filter = filter.sql,
        );
        Ok(self
            .query(&sql, filter.params.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(member_team)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<search::MemberTeam>, search::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<search::MemberTeam>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<search::MemberTeam>, search::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let search::Selector {
            condition,
            pageable,
            sort,
        } = by.into_inner();
        let (limit, offset) = limit_offset(pageable);

        let mut filter = Where::new(&condition);
        let limit_idx = filter.bind(&limit);
        let offset_idx = filter.bind(&offset);

        let sql = format!(
            "{MEMBER_TEAM} \
             {filter} \
             ORDER BY {order} \
             LIMIT ${limit_idx}::INT8 \
             OFFSET ${offset_idx}::INT8",
            filter = filter.sql,
            order = order_by(&sort, qualified),
        );
        Ok(self
            .query(&sql, filter.params.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(member_team)
            .collect())
    }
}

impl<C> Database<Select<By<search::TotalCount, search::Condition>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = search::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<search::TotalCount, search::Condition>>,
    ) -> Result<Self::Ok, Self::Err> {
        let condition = by.into_inner();
        let filter = Where::new(&condition);

        // Every `Member` has at most one `Team`, so the join can't change the
        // count unless it's filtered by.
        let join = if condition.team_name.is_some() {
            "LEFT JOIN teams AS t ON t.id = m.team_id"
        } else {
            ""
        };
        let sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM members AS m \
             {join} \
             {filter}",
            filter = filter.sql,
        );
        self.query_one(&sql, filter.params.as_slice())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.get::<_, i64>(0).unsigned_abs().into())
    }
}

impl<C> Database<Select<By<search::Page, search::Selector>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = search::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<search::Page, search::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let search::Selector {
            condition,
            pageable,
            sort,
        } = by.into_inner();
        let (limit, offset) = limit_offset(pageable);

        let mut filter = Where::new(&condition);
        let limit_idx = filter.bind(&limit);
        let offset_idx = filter.bind(&offset);

        // Counting is done over the unordered filtered set, while the page is
        // left-joined to it, so the total is returned even for an empty page.
        let order = order_by(&sort, projected);
        let sql = format!(
            "WITH filtered AS ({MEMBER_TEAM} {filter}), \
             page AS (\
                 SELECT * \
                 FROM filtered \
                 ORDER BY {order} \
                 LIMIT ${limit_idx}::INT8 \
                 OFFSET ${offset_idx}::INT8\
             ) \
             SELECT total.count, page.* \
             FROM (SELECT COUNT(*)::INT8 AS count FROM filtered) AS total \
             LEFT JOIN page ON true \
             ORDER BY {order}",
            filter = filter.sql,
        );
        let rows = self
            .query(&sql, filter.params.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let total = rows
            .first()
            .map_or(0, |row| row.get::<_, i64>("count").unsigned_abs());
        let content = rows
            .iter()
            .filter(|row| row.get::<_, Option<member::Id>>("member_id").is_some())
            .map(member_team)
            .collect();

        Ok(search::Page::new(content, pageable, total))
    }
}

impl<C> Database<Select<By<Vec<Member>, list::Selector>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Member>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Member>, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Selector {
            age,
            sort,
            offset,
            limit,
        } = by.into_inner();
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&offset];
        let age_idx = age.as_ref().map(|a| {
            ps.push(a);
            ps.len()
        });
        let limit_idx = limit.as_ref().map(|l| {
            ps.push(l);
            ps.len()
        });

        let sql = format!(
            "SELECT m.id, m.username, m.age, m.team_id \
             FROM members AS m \
             LEFT JOIN teams AS t ON t.id = m.team_id \
             WHERE true \
                   {age_filtering} \
             ORDER BY {order} \
             OFFSET $1::INT8 \
             {limiting}",
            age_filtering = age_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND m.age = ${idx}::INT4"))
            }),
            order = order_by(&sort, qualified),
            limiting = limit_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("LIMIT ${idx}::INT8"))
            }),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(member)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Member>, team::Name>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Member>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Member>, team::Name>>,
    ) -> Result<Self::Ok, Self::Err> {
        let name: team::Name = by.into_inner();

        const SQL: &str = "\
            SELECT m.id, m.username, m.age, m.team_id \
            FROM members AS m \
            INNER JOIN teams AS t ON t.id = m.team_id \
            WHERE t.name = $1::VARCHAR \
            ORDER BY m.id ASC";
        Ok(self
            .query(SQL, &[&name])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(member)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Member>, read::member::NamesakesOfTeams>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Member>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Member>, read::member::NamesakesOfTeams>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT m.id, m.username, m.age, m.team_id \
            FROM members AS m, teams AS t \
            WHERE m.username = t.name \
            ORDER BY m.id ASC";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(member)
            .collect())
    }
}

/// Reads a [`read::WithTeam`] out of the `members` table `row` left-joined
/// with `teams` columns prefixed by `team_`.
fn with_team(row: &Row) -> read::WithTeam {
    read::WithTeam {
        member: member(row),
        team: row
            .get::<_, Option<team::Id>>("team_ref")
            .map(|id| Team {
                id,
                name: row.get("team_name"),
            }),
    }
}

impl<C> Database<Select<By<Vec<read::WithTeam>, TeamJoin>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::WithTeam>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::WithTeam>, TeamJoin>>,
    ) -> Result<Self::Ok, Self::Err> {
        const COLUMNS: &str = "\
            SELECT m.id, m.username, m.age, m.team_id, \
                   t.id AS team_ref, t.name AS team_name \
            FROM members AS m";

        let rows = match by.into_inner() {
            TeamJoin::Named(name) => {
                let sql = format!(
                    "{COLUMNS} \
                     LEFT JOIN teams AS t ON t.id = m.team_id \
                                         AND t.name = $1::VARCHAR \
                     ORDER BY m.id ASC",
                );
                self.query(&sql, &[&name]).await
            }
            TeamJoin::Namesake => {
                let sql = format!(
                    "{COLUMNS} \
                     LEFT JOIN teams AS t ON t.name = m.username \
                     ORDER BY m.id ASC",
                );
                self.query(&sql, &[]).await
            }
        }
        .map_err(tracerr::wrap!())?;

        Ok(rows.iter().map(with_team).collect())
    }
}

impl<C> Database<Select<By<Option<read::WithTeam>, member::Username>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<read::WithTeam>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::WithTeam>, member::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username: member::Username = by.into_inner();

        const SQL: &str = "\
            SELECT m.id, m.username, m.age, m.team_id, \
                   t.id AS team_ref, t.name AS team_name \
            FROM members AS m \
            LEFT JOIN teams AS t ON t.id = m.team_id \
            WHERE m.username = $1::VARCHAR \
            ORDER BY m.id ASC \
            LIMIT 1";
        self.query_opt(SQL, &[&username])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(with_team))
    }
}

impl<C> Database<Select<By<read::member::Stats, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::member::Stats;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::member::Stats, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT8 AS count, \
                   SUM(age)::INT8 AS sum, \
                   AVG(age)::FLOAT8 AS avg, \
                   MAX(age) AS max, \
                   MIN(age) AS min \
            FROM members";
        self.query_one(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| read::member::Stats {
                count: row.get::<_, i64>("count").unsigned_abs(),
                sum: row.get("sum"),
                avg: row.get("avg"),
                max: row.get("max"),
                min: row.get("min"),
            })
    }
}

impl<C> Database<Update<bulk::Rename>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(rename): Update<bulk::Rename>,
    ) -> Result<Self::Ok, Self::Err> {
        let bulk::Rename {
            username,
            younger_than,
        } = rename;

        const SQL: &str = "\
            UPDATE members \
            SET username = $1::VARCHAR \
            WHERE age < $2::INT4";
        self.exec(SQL, &[&username, &younger_than])
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<bulk::AddAge>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(bulk::AddAge(delta)): Update<bulk::AddAge>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            UPDATE members \
            SET age = age + $1::INT4";
        self.exec(SQL, &[&delta])
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<bulk::OlderThan>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(bulk::OlderThan(age)): Delete<bulk::OlderThan>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            DELETE FROM members \
            WHERE age > $1::INT4";
        self.exec(SQL, &[&age])
            .await
            .map_err(tracerr::wrap!())
    }
}
