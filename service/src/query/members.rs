//! [`Query`] collection related to the multiple [`Member`]s.

use common::operations::{By, Commit, Select, Snapshot, Snapshotted};
use derive_more::{Display, Error, From};
use tokio::sync::OnceCell;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Team;
use crate::{
    domain::{team, Member},
    infra::{database, Database},
    read::{
        self,
        member::{list, search, TeamJoin},
    },
    Config, Service,
};

use super::{DatabaseQuery, Query};

/// Queries all the [`search::MemberTeam`]s satisfying a [`search::Condition`],
/// without paging them.
pub type Search =
    DatabaseQuery<By<Vec<search::MemberTeam>, search::Condition>>;

/// Queries total count of [`search::MemberTeam`]s satisfying a
/// [`search::Condition`].
pub type TotalCount =
    DatabaseQuery<By<search::TotalCount, search::Condition>>;

/// Queries a plain list of [`Member`]s.
pub type List = DatabaseQuery<By<Vec<Member>, list::Selector>>;

/// Queries [`Member`]s of the [`Team`] with the provided [`team::Name`].
pub type OfTeam = DatabaseQuery<By<Vec<Member>, team::Name>>;

/// Queries [`Member`]s whose username equals to a name of some [`Team`].
pub type NamesakesOfTeams =
    DatabaseQuery<By<Vec<Member>, read::member::NamesakesOfTeams>>;

/// Queries all the [`Member`]s along with the [`Team`]s joined by the provided
/// [`TeamJoin`].
pub type WithTeams = DatabaseQuery<By<Vec<read::WithTeam>, TeamJoin>>;

/// Queries aggregated [`read::member::Stats`] of all the [`Member`]s.
pub type Stats = DatabaseQuery<By<read::member::Stats, ()>>;

/// Checks the provided [`search::Pageable`] against the [`Config`] limits.
fn check_page_size(
    config: &Config,
    pageable: search::Pageable,
) -> Result<(), Traced<SearchError>> {
    if pageable.size() > config.max_page_size {
        return Err(tracerr::new!(SearchError::PageSizeExceeded {
            size: pageable.size(),
            max: config.max_page_size,
        }));
    }
    Ok(())
}

/// [`Query`] of a [`search::Page`], fetching its content and total count with
/// a single combined statement.
#[derive(Clone, Debug, From)]
pub struct SearchPageSimple(pub search::Selector);

impl<Db> Query<SearchPageSimple> for Service<Db>
where
    Db: Database<
        Select<By<search::Page, search::Selector>>,
        Ok = search::Page,
        Err = Traced<database::Error>,
    >,
{
    type Ok = search::Page;
    type Err = Traced<SearchError>;

    async fn execute(
        &self,
        SearchPageSimple(selector): SearchPageSimple,
    ) -> Result<Self::Ok, Self::Err> {
        check_page_size(self.config(), selector.pageable)?;

        self.database()
            .execute(Select(By::new(selector)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> SearchError))
    }
}

/// [`Query`] of a [`search::Page`], fetching its content and total count with
/// two separate statements observing the same [`Snapshot`] of the data.
#[derive(Clone, Debug, From)]
pub struct SearchPageComplex(pub search::Selector);

impl<Db> Query<SearchPageComplex> for Service<Db>
where
    Db: Database<Snapshot, Err = Traced<database::Error>>,
    Snapshotted<Db>: Database<
            Select<By<Vec<search::MemberTeam>, search::Selector>>,
            Ok = Vec<search::MemberTeam>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<search::TotalCount, search::Condition>>,
            Ok = search::TotalCount,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = search::Page;
    type Err = Traced<SearchError>;

    async fn execute(
        &self,
        SearchPageComplex(selector): SearchPageComplex,
    ) -> Result<Self::Ok, Self::Err> {
        use SearchError as E;

        check_page_size(self.config(), selector.pageable)?;
        let pageable = selector.pageable;
        let condition = selector.condition.clone();

        let tx = self
            .database()
            .execute(Snapshot)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let content = tx
            .execute(Select(By::new(selector)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let total = tx
            .execute(Select(By::<search::TotalCount, _>::new(condition)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(search::Page::new(content, pageable, total.into()))
    }
}

/// [`Query`] of a [`LazyPage`], fetching its content eagerly and deferring
/// counting until the total is actually requested.
#[derive(Clone, Debug, From)]
pub struct SearchPageDeferred(pub search::Selector);

impl<Db> Query<SearchPageDeferred> for Service<Db>
where
    Db: Database<
            Select<By<Vec<search::MemberTeam>, search::Selector>>,
            Ok = Vec<search::MemberTeam>,
            Err = Traced<database::Error>,
        > + Clone,
{
    type Ok = LazyPage<Db>;
    type Err = Traced<SearchError>;

    async fn execute(
        &self,
        SearchPageDeferred(selector): SearchPageDeferred,
    ) -> Result<Self::Ok, Self::Err> {
        check_page_size(self.config(), selector.pageable)?;
        let pageable = selector.pageable;
        let condition = selector.condition.clone();

        let content = self
            .database()
            .execute(Select(By::new(selector)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> SearchError))?;

        Ok(LazyPage {
            content,
            pageable,
            condition,
            database: self.database().clone(),
            total: OnceCell::new(),
        })
    }
}

/// [`search::Page`] whose total count is computed on the first request only.
#[derive(Debug)]
pub struct LazyPage<Db> {
    /// [`search::MemberTeam`]s on this [`LazyPage`].
    content: Vec<search::MemberTeam>,

    /// [`search::Pageable`] this [`LazyPage`] was requested with.
    pageable: search::Pageable,

    /// [`search::Condition`] to count [`search::MemberTeam`]s by.
    condition: search::Condition,

    /// [`Database`] to count [`search::MemberTeam`]s in.
    database: Db,

    /// Total count, once computed.
    total: OnceCell<u64>,
}

impl<Db> LazyPage<Db> {
    /// Returns [`search::MemberTeam`]s on this [`LazyPage`].
    #[must_use]
    pub fn content(&self) -> &[search::MemberTeam] {
        &self.content
    }

    /// Returns [`search::Pageable`] this [`LazyPage`] was requested with.
    #[must_use]
    pub fn pageable(&self) -> search::Pageable {
        self.pageable
    }
}

impl<Db> LazyPage<Db>
where
    Db: Database<
        Select<By<search::TotalCount, search::Condition>>,
        Ok = search::TotalCount,
        Err = Traced<database::Error>,
    >,
{
    /// Returns total count of [`search::MemberTeam`]s across all pages,
    /// counting them on the first call.
    ///
    /// # Errors
    ///
    /// If failed to count [`search::MemberTeam`]s.
    pub async fn total(&self) -> Result<u64, Traced<SearchError>> {
        self.total
            .get_or_try_init(|| async {
                tracing::debug!("counting deferred page total");
                self.database
                    .execute(Select(By::<search::TotalCount, _>::new(
                        self.condition.clone(),
                    )))
                    .await
                    .map(u64::from)
                    .map_err(tracerr::map_from_and_wrap!(=> SearchError))
            })
            .await
            .copied()
    }

    /// Resolves this [`LazyPage`] into a regular [`search::Page`], counting
    /// its total if not done yet.
    ///
    /// # Errors
    ///
    /// If failed to count [`search::MemberTeam`]s.
    pub async fn into_page(self) -> Result<search::Page, Traced<SearchError>> {
        let total = self.total().await?;
        Ok(search::Page::new(self.content, self.pageable, total))
    }
}

/// [`Query`] of a [`search::Page`], skipping counting whenever the total can
/// be inferred from the fetched content.
///
/// See [`common::Pageable::infer_total()`] for the inference rules.
#[derive(Clone, Debug, From)]
pub struct SearchPageOptimized(pub search::Selector);

impl<Db> Query<SearchPageOptimized> for Service<Db>
where
    Db: Database<
            Select<By<Vec<search::MemberTeam>, search::Selector>>,
            Ok = Vec<search::MemberTeam>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<search::TotalCount, search::Condition>>,
            Ok = search::TotalCount,
            Err = Traced<database::Error>,
        >,
{
    type Ok = search::Page;
    type Err = Traced<SearchError>;

    async fn execute(
        &self,
        SearchPageOptimized(selector): SearchPageOptimized,
    ) -> Result<Self::Ok, Self::Err> {
        use SearchError as E;

        check_page_size(self.config(), selector.pageable)?;
        let pageable = selector.pageable;
        let condition = selector.condition.clone();

        let content = self
            .database()
            .execute(Select(By::new(selector)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let db = self.database();
        let mut counted = false;
        let page = search::Page::with_total(content, pageable, || {
            counted = true;
            async move {
                db.execute(Select(By::<search::TotalCount, _>::new(condition)))
                    .await
                    .map(u64::from)
                    .map_err(tracerr::map_from_and_wrap!(=> E))
            }
        })
        .await?;

        tracing::debug!(
            counted,
            total = page.total(),
            "fetched optimized members page"
        );
        Ok(page)
    }
}

/// Error of a [`search::Page`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum SearchError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Requested page size exceeds the [`Config::max_page_size`].
    #[display("Page size {size} exceeds the maximum of {max}")]
    #[from(ignore)]
    PageSizeExceeded {
        /// Requested page size.
        size: u64,

        /// Maximum allowed page size.
        max: u64,
    },
}

#[cfg(test)]
mod spec {
    use std::{
        cmp::Ordering,
        sync::{
            atomic::{AtomicUsize, Ordering as AtomicOrdering},
            Arc,
        },
    };

    use common::{
        operations::{By, Commit, Select, Snapshot},
        pagination::{Direction, Nulls},
    };
    use tracerr::Traced;
    use uuid::Uuid;

    use crate::{
        domain::{member, team, Member},
        infra::{database, Database},
        read::member::{list, search, SortKey},
        Config, Service,
    };

    use super::{
        List, SearchError, SearchPageComplex, SearchPageDeferred,
        SearchPageOptimized, SearchPageSimple,
    };

    /// In-memory [`Database`] counting the performed operations.
    #[derive(Clone, Debug, Default)]
    struct MockDb {
        rows: Arc<Vec<search::MemberTeam>>,
        counts: Arc<AtomicUsize>,
        snapshots: Arc<AtomicUsize>,
        commits: Arc<AtomicUsize>,
    }

    impl MockDb {
        fn counts(&self) -> usize {
            self.counts.load(AtomicOrdering::SeqCst)
        }

        fn filtered(
            &self,
            condition: &search::Condition,
        ) -> Vec<search::MemberTeam> {
            self.rows
                .iter()
                .filter(|row| condition.matches(row))
                .cloned()
                .collect()
        }

        fn content(
            &self,
            selector: &search::Selector,
        ) -> Vec<search::MemberTeam> {
            let mut rows = self.filtered(&selector.condition);
            rows.sort_by(|a, b| compare(a, b, &selector.sort));
            rows.into_iter()
                .skip(usize::try_from(selector.pageable.offset()).unwrap())
                .take(usize::try_from(selector.pageable.size()).unwrap())
                .collect()
        }
    }

    fn compare_nullable<T: Ord>(
        a: Option<&T>,
        b: Option<&T>,
        sort: &search::Sort,
    ) -> Ordering {
        let null_first = match sort.nulls_placement() {
            Nulls::First => Ordering::Less,
            Nulls::Last => Ordering::Greater,
        };
        match (a, b) {
            (Some(a), Some(b)) => match sort.direction {
                Direction::Ascending => a.cmp(b),
                Direction::Descending => b.cmp(a),
            },
            (None, None) => Ordering::Equal,
            (None, Some(_)) => null_first,
            (Some(_), None) => null_first.reverse(),
        }
    }

    fn compare(
        a: &search::MemberTeam,
        b: &search::MemberTeam,
        sort: &[search::Sort],
    ) -> Ordering {
        sort.iter()
            .map(|s| match s.key {
                SortKey::Id => {
                    compare_nullable(Some(&a.member_id), Some(&b.member_id), s)
                }
                SortKey::Username => {
                    compare_nullable(a.username.as_ref(), b.username.as_ref(), s)
                }
                SortKey::Age => compare_nullable(Some(&a.age), Some(&b.age), s),
                SortKey::TeamName => compare_nullable(
                    a.team_name.as_ref(),
                    b.team_name.as_ref(),
                    s,
                ),
            })
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.member_id.cmp(&b.member_id))
    }

    impl Database<Select<By<Vec<search::MemberTeam>, search::Selector>>>
        for MockDb
    {
        type Ok = Vec<search::MemberTeam>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Vec<search::MemberTeam>, search::Selector>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(self.content(by.as_inner()))
        }
    }

    impl Database<Select<By<Vec<Member>, list::Selector>>> for MockDb {
        type Ok = Vec<Member>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Vec<Member>, list::Selector>>,
        ) -> Result<Self::Ok, Self::Err> {
            let selector = by.into_inner();
            let mut rows = self
                .rows
                .iter()
                .filter(|r| selector.age.map_or(true, |age| r.age == age))
                .cloned()
                .collect::<Vec<_>>();
            rows.sort_by(|a, b| compare(a, b, &selector.sort));
            Ok(rows
                .into_iter()
                .skip(usize::try_from(selector.offset).unwrap())
                .take(selector.limit.map_or(usize::MAX, |l| {
                    usize::try_from(l).unwrap()
                }))
                .map(|r| Member {
                    id: r.member_id,
                    username: r.username,
                    age: r.age,
                    team_id: r.team_id,
                })
                .collect())
        }
    }

    impl Database<Select<By<search::TotalCount, search::Condition>>> for MockDb {
        type Ok = search::TotalCount;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<search::TotalCount, search::Condition>>,
        ) -> Result<Self::Ok, Self::Err> {
            _ = self.counts.fetch_add(1, AtomicOrdering::SeqCst);
            let total = self.filtered(by.as_inner()).len();
            Ok(u64::try_from(total).unwrap().into())
        }
    }

    impl Database<Select<By<search::Page, search::Selector>>> for MockDb {
        type Ok = search::Page;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<search::Page, search::Selector>>,
        ) -> Result<Self::Ok, Self::Err> {
            let selector = by.into_inner();
            let total = self.filtered(&selector.condition).len();
            Ok(search::Page::new(
                self.content(&selector),
                selector.pageable,
                u64::try_from(total).unwrap(),
            ))
        }
    }

    impl Database<Snapshot> for MockDb {
        type Ok = Self;
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Snapshot) -> Result<Self::Ok, Self::Err> {
            _ = self.snapshots.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(self.clone())
        }
    }

    impl Database<Commit> for MockDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
            _ = self.commits.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(())
        }
    }

    fn row(
        n: u128,
        username: Option<&str>,
        age: i32,
        team: Option<(u128, &str)>,
    ) -> search::MemberTeam {
        search::MemberTeam {
            member_id: Uuid::from_u128(n).into(),
            username: username.and_then(member::Username::new),
            age: member::Age::new(age).unwrap(),
            team_id: team.map(|(id, _)| Uuid::from_u128(id).into()),
            team_name: team.and_then(|(_, name)| team::Name::new(name)),
        }
    }

    /// Two [`Team`]s with two [`Member`]s each.
    ///
    /// [`Member`]: crate::domain::Member
    /// [`Team`]: crate::domain::Team
    fn service() -> Service<MockDb> {
        let a = Some((100, "teamA"));
        let b = Some((200, "teamB"));
        let db = MockDb {
            rows: Arc::new(vec![
                row(1, Some("member1"), 10, a),
                row(2, Some("member2"), 20, a),
                row(3, Some("member3"), 30, b),
                row(4, Some("member4"), 40, b),
            ]),
            ..MockDb::default()
        };
        Service::new(Config::default(), db)
    }

    fn selector(
        condition: search::Condition,
        offset: u64,
        size: u64,
    ) -> search::Selector {
        search::Selector {
            condition,
            pageable: search::Pageable::new(offset, size).unwrap(),
            sort: vec![],
        }
    }

    fn usernames(rows: &[search::MemberTeam]) -> Vec<&str> {
        rows.iter()
            .map(|r| r.username.as_ref().map_or("", AsRef::as_ref))
            .collect()
    }

    #[tokio::test]
    async fn filters_by_present_fields_only() {
        let svc = service();

        let all = svc
            .execute(SearchPageSimple(selector(
                search::Condition::default(),
                0,
                10,
            )))
            .await
            .unwrap();
        assert_eq!(all.total(), 4);

        let adults = svc
            .execute(SearchPageSimple(selector(
                search::Condition {
                    age_goe: member::Age::new(20),
                    ..search::Condition::default()
                },
                0,
                10,
            )))
            .await
            .unwrap();
        assert_eq!(adults.total(), 3);
        assert_eq!(
            usernames(adults.content()),
            ["member2", "member3", "member4"],
        );

        let team_b = svc
            .execute(SearchPageSimple(selector(
                search::Condition {
                    team_name: team::Name::new("teamB"),
                    age_loe: member::Age::new(35),
                    ..search::Condition::default()
                },
                0,
                10,
            )))
            .await
            .unwrap();
        assert_eq!(usernames(team_b.content()), ["member3"]);
    }

    #[tokio::test]
    async fn strategies_agree() {
        let svc = service();
        let condition = search::Condition {
            age_goe: member::Age::new(15),
            ..search::Condition::default()
        };

        for (offset, size) in [(0, 2), (2, 2), (1, 5), (6, 2)] {
            let sel = selector(condition.clone(), offset, size);

            let simple =
                svc.execute(SearchPageSimple(sel.clone())).await.unwrap();
            let complex =
                svc.execute(SearchPageComplex(sel.clone())).await.unwrap();
            let deferred = svc
                .execute(SearchPageDeferred(sel.clone()))
                .await
                .unwrap()
                .into_page()
                .await
                .unwrap();
            let optimized =
                svc.execute(SearchPageOptimized(sel)).await.unwrap();

            assert_eq!(simple, complex, "offset {offset}, size {size}");
            assert_eq!(simple, deferred, "offset {offset}, size {size}");
            assert_eq!(simple, optimized, "offset {offset}, size {size}");
            assert_eq!(simple.total(), 3);
        }
    }

    #[tokio::test]
    async fn reads_complex_page_in_single_snapshot() {
        let svc = service();

        let page = svc
            .execute(SearchPageComplex(selector(
                search::Condition::default(),
                0,
                3,
            )))
            .await
            .unwrap();

        assert_eq!(page.total(), 4);
        assert_eq!(page.total_pages(), 2);
        assert!(page.has_next());
        assert_eq!(svc.database().snapshots.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(svc.database().commits.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(svc.database().counts(), 1);
    }

    #[tokio::test]
    async fn defers_counting_until_requested() {
        let svc = service();

        let page = svc
            .execute(SearchPageDeferred(selector(
                search::Condition::default(),
                0,
                3,
            )))
            .await
            .unwrap();
        assert_eq!(page.content().len(), 3);
        assert_eq!(svc.database().counts(), 0);

        assert_eq!(page.total().await.unwrap(), 4);
        assert_eq!(page.total().await.unwrap(), 4);
        assert_eq!(svc.database().counts(), 1);
    }

    #[tokio::test]
    async fn skips_counting_when_total_is_inferable() {
        let svc = service();
        let all = search::Condition::default();

        // First page isn't full.
        let page = svc
            .execute(SearchPageOptimized(selector(all.clone(), 0, 10)))
            .await
            .unwrap();
        assert_eq!(page.total(), 4);
        assert_eq!(svc.database().counts(), 0);

        // Last page isn't full.
        let page = svc
            .execute(SearchPageOptimized(selector(all.clone(), 3, 2)))
            .await
            .unwrap();
        assert_eq!(page.total(), 4);
        assert_eq!(svc.database().counts(), 0);

        // Full page.
        let page = svc
            .execute(SearchPageOptimized(selector(all.clone(), 0, 2)))
            .await
            .unwrap();
        assert_eq!(page.total(), 4);
        assert_eq!(svc.database().counts(), 1);

        // Empty page beyond the end.
        let page = svc
            .execute(SearchPageOptimized(selector(all, 10, 2)))
            .await
            .unwrap();
        assert!(page.content().is_empty());
        assert_eq!(page.total(), 4);
        assert_eq!(svc.database().counts(), 2);
    }

    #[tokio::test]
    async fn returns_total_for_page_beyond_the_end() {
        let svc = service();

        let page = svc
            .execute(SearchPageSimple(selector(
                search::Condition::default(),
                8,
                4,
            )))
            .await
            .unwrap();

        assert!(page.content().is_empty());
        assert_eq!(page.total(), 4);
        assert!(!page.has_next());
    }

    #[tokio::test]
    async fn sorts_with_nulls_placement() {
        let a = Some((100, "teamA"));
        let db = MockDb {
            rows: Arc::new(vec![
                row(1, None, 10, a),
                row(2, Some("zed"), 20, None),
                row(3, Some("amy"), 30, a),
            ]),
            ..MockDb::default()
        };
        let svc = Service::new(Config::default(), db);

        let mut sel = selector(search::Condition::default(), 0, 10);
        sel.sort = vec![search::Sort::asc(SortKey::Username).nulls_first()];
        let page = svc.execute(SearchPageSimple(sel.clone())).await.unwrap();
        assert_eq!(usernames(page.content()), ["", "amy", "zed"]);

        sel.sort = vec![search::Sort::desc(SortKey::TeamName).nulls_last()];
        let page = svc.execute(SearchPageSimple(sel)).await.unwrap();
        assert_eq!(usernames(page.content()), ["", "amy", "zed"]);
    }

    /// Three [`Member`]s aged 100, one of them without a username, and a
    /// younger one.
    fn centenarians() -> Service<MockDb> {
        let db = MockDb {
            rows: Arc::new(vec![
                row(1, None, 100, None),
                row(2, Some("member6"), 100, None),
                row(3, Some("member5"), 100, None),
                row(4, Some("member1"), 10, None),
            ]),
            ..MockDb::default()
        };
        Service::new(Config::default(), db)
    }

    #[tokio::test]
    async fn places_null_usernames_last_within_age_group() {
        let svc = centenarians();

        let mut sel = selector(search::Condition::default(), 0, 10);
        sel.sort = vec![
            search::Sort::desc(SortKey::Age),
            search::Sort::asc(SortKey::Username),
        ];
        let page = svc.execute(SearchPageSimple(sel)).await.unwrap();

        assert_eq!(
            usernames(page.content()),
            ["member5", "member6", "", "member1"],
        );
    }

    #[tokio::test]
    async fn lists_members_without_counting() {
        let svc = centenarians();
        let sort = vec![
            list::Sort::desc(SortKey::Age),
            list::Sort::asc(SortKey::Username),
        ];
        let names = |ms: &[Member]| {
            ms.iter()
                .map(|m| {
                    m.username.as_ref().map_or(String::new(), |u| {
                        AsRef::<str>::as_ref(u).to_owned()
                    })
                })
                .collect::<Vec<_>>()
        };

        let all = svc
            .execute(List::by(list::Selector {
                sort: sort.clone(),
                ..list::Selector::default()
            }))
            .await
            .unwrap();
        assert_eq!(names(&all), ["member5", "member6", "", "member1"]);

        let second = svc
            .execute(List::by(list::Selector {
                age: member::Age::new(100),
                sort,
                offset: 1,
                limit: Some(1),
            }))
            .await
            .unwrap();
        assert_eq!(names(&second), ["member6"]);

        assert_eq!(svc.database().counts(), 0);
    }

    #[tokio::test]
    async fn rejects_too_large_page() {
        let svc = service();
        let max = svc.config().max_page_size;

        let err = svc
            .execute(SearchPageOptimized(selector(
                search::Condition::default(),
                0,
                max + 1,
            )))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            SearchError::PageSizeExceeded { size, .. } if *size == max + 1,
        ));
        assert_eq!(svc.database().counts(), 0);
    }
}
