//! [`NonTx`] client definitions.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection},
};
#[cfg(doc)]
use crate::infra::database::postgres::Connection;

/// Non-transactional Postgres database client.
///
/// Acquires a pooled [`Connection`] on the first use and holds it until it's
/// taken by a [`Tx`] client.
///
/// [`Tx`]: super::Tx
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to acquire [`Connection`]s from.
    pub(crate) pool: connection::Pool,

    /// Acquired [`Connection`], if any.
    connection: Arc<RwLock<Option<connection::NonTx>>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client from the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            connection: Arc::new(RwLock::new(None)),
        }
    }

    /// Acquires a new [`Connection`] from the [`connection::Pool`].
    pub(crate) async fn acquire(
        &self,
    ) -> Result<connection::NonTx, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Returns the underlying [`Connection`] of this [`NonTx`] client,
    /// acquiring it if necessary.
    pub(crate) async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        super::get_or_try_init(&self.connection, || self.acquire())
            .await
            .map_err(tracerr::wrap!())
    }

    /// Takes the underlying [`Connection`] from this [`NonTx`] client, if it
    /// has been acquired.
    ///
    /// Next time this [`NonTx`] client is used, it will acquire a new
    /// [`Connection`].
    #[must_use]
    pub(crate) async fn take_connection(&self) -> Option<connection::NonTx> {
        self.connection.write().await.take()
    }
}

connection::impl_connection!(traced NonTx, |c| c
    .connection()
    .await
    .map_err(::tracerr::wrap!())?);
