//! [`Connection`] definitions.

use std::{fmt, future::Future};

use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio_postgres::{types::ToSql, IsolationLevel, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as NonTx, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Mode of a transaction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// Read-write transaction with the default isolation level.
    #[default]
    ReadWrite,

    /// Read-only transaction observing a single snapshot of the data.
    Snapshot,
}

/// Transactional Postgres database [`Connection`].
#[self_referencing]
pub struct Tx {
    /// [`NonTx`] [`Connection`] the transaction was started from.
    non_tx: NonTx,

    /// Transaction started in the [`Connection`].
    #[borrows(mut non_tx)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx")
            .field("tx", self.tx())
            .finish_non_exhaustive()
    }
}

impl Tx {
    /// Returns the underlying [`Transaction`] of this [`Tx`] connection.
    ///
    /// [`Transaction`]: deadpool_postgres::Transaction
    fn tx(&self) -> &deadpool_postgres::Transaction<'_> {
        self.with_tx(|tx| tx.as_ref().expect("already committed"))
    }

    /// Starts a new [`Tx`] of the provided [`Mode`] in the provided [`NonTx`]
    /// [`Connection`].
    ///
    /// # Errors
    ///
    /// If failed to start a transaction in the provided [`NonTx`].
    pub async fn from_non_tx(
        client: NonTx,
        mode: Mode,
    ) -> Result<Tx, Traced<database::Error>> {
        Tx::try_new_async_send(client, move |c| {
            let builder = c.build_transaction();
            let builder = match mode {
                Mode::ReadWrite => builder,
                Mode::Snapshot => builder
                    .isolation_level(IsolationLevel::RepeatableRead)
                    .read_only(true),
            };
            builder.start().map_ok(Some).boxed()
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
    }

    /// Commits this [`Tx`].
    ///
    /// # Errors
    ///
    /// If failed to commit this [`Tx`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance, see \
                      https://doc.rust-lang.org/nomicon/subtyping.html#variance"
        )]
        self.with_tx_mut(|tx| tx.take())
            .expect("already committed")
            .commit()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

/// Generic database connection.
pub trait Connection {
    /// Queries the provided statement with the given parameters and returns the
    /// resulting rows.
    ///
    /// # Errors
    ///
    /// If failed to query the statement.
    fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Queries the provided statement with the given parameters and returns the
    /// optional resulting row.
    ///
    /// # Errors
    ///
    /// If failed to query the statement, or it returns more than one row.
    fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Queries the provided statement with the given parameters and returns
    /// exactly one resulting row.
    ///
    /// # Errors
    ///
    /// If failed to query the statement, or it returns not exactly one row.
    fn query_one<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Row, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Executes the provided statement with the given parameters and returns
    /// the number of affected rows.
    ///
    /// # Errors
    ///
    /// If failed to execute the statement.
    fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;
}

/// Implements [`Connection`] for a type by delegating to the client returned by
/// the provided expression.
///
/// - `raw` clients are [`tokio_postgres`] ones, so their errors are converted;
/// - `traced` clients are [`Connection`]s themselves.
macro_rules! impl_connection {
    (raw $ty:ty, |$this:ident| $client:expr) => {
        $crate::infra::database::postgres::connection::impl_connection!(
            @impl $ty,
            |$this, stmt, params| {
                query => ($client).query(stmt, params),
                query_opt => ($client).query_opt(stmt, params),
                query_one => ($client).query_one(stmt, params),
                exec => ($client).execute(stmt, params),
            },
            |res| res
                .map_err(::tracerr::from_and_wrap!(
                    => $crate::infra::database::postgres::Error
                ))
                .map_err(::tracerr::map_from)
        );
    };
    (traced $ty:ty, |$this:ident| $client:expr) => {
        $crate::infra::database::postgres::connection::impl_connection!(
            @impl $ty,
            |$this, stmt, params| {
                query => $crate::infra::database::postgres::Connection::query(
                    &*$client, stmt, params,
                ),
                query_opt =>
                    $crate::infra::database::postgres::Connection::query_opt(
                        &*$client, stmt, params,
                    ),
                query_one =>
                    $crate::infra::database::postgres::Connection::query_one(
                        &*$client, stmt, params,
                    ),
                exec => $crate::infra::database::postgres::Connection::exec(
                    &*$client, stmt, params,
                ),
            },
            |res| res.map_err(::tracerr::wrap!())
        );
    };
    (
        @impl $ty:ty,
        |$this:ident, $stmt:ident, $params:ident| {
            query => $query:expr,
            query_opt => $query_opt:expr,
            query_one => $query_one:expr,
            exec => $exec:expr $(,)?
        },
        |$res:ident| $conv:expr
    ) => {
        impl $crate::infra::database::postgres::Connection for $ty {
            async fn query<T>(
                &self,
                $stmt: &T,
                $params: &[&(dyn ::tokio_postgres::types::ToSql + Sync)],
            ) -> Result<
                Vec<::tokio_postgres::Row>,
                ::tracerr::Traced<$crate::infra::database::Error>,
            >
            where
                T: ::tokio_postgres::ToStatement + ?Sized,
            {
                let $this = self;
                let $res = $query.await;
                $conv
            }

            async fn query_opt<T>(
                &self,
                $stmt: &T,
                $params: &[&(dyn ::tokio_postgres::types::ToSql + Sync)],
            ) -> Result<
                Option<::tokio_postgres::Row>,
                ::tracerr::Traced<$crate::infra::database::Error>,
            >
            where
                T: ::tokio_postgres::ToStatement + ?Sized,
            {
                let $this = self;
                let $res = $query_opt.await;
                $conv
            }

            async fn query_one<T>(
                &self,
                $stmt: &T,
                $params: &[&(dyn ::tokio_postgres::types::ToSql + Sync)],
            ) -> Result<
                ::tokio_postgres::Row,
                ::tracerr::Traced<$crate::infra::database::Error>,
            >
            where
                T: ::tokio_postgres::ToStatement + ?Sized,
            {
                let $this = self;
                let $res = $query_one.await;
                $conv
            }

            async fn exec<T>(
                &self,
                $stmt: &T,
                $params: &[&(dyn ::tokio_postgres::types::ToSql + Sync)],
            ) -> Result<u64, ::tracerr::Traced<$crate::infra::database::Error>>
            where
                T: ::tokio_postgres::ToStatement + ?Sized,
            {
                let $this = self;
                let $res = $exec.await;
                $conv
            }
        }
    };
}
pub(crate) use impl_connection;

impl_connection!(raw NonTx, |c| **c);
impl_connection!(raw Tx, |c| c.tx());
