//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::connection::{self, Mode},
};
#[cfg(doc)]
use crate::infra::database::postgres::Connection;

use super::NonTx;

/// Transactional Postgres database client.
///
/// The transaction is started lazily, on the first use of this client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`Mode`] of the transaction.
    mode: Mode,

    /// Inner representation of this client.
    inner: Arc<Inner>,
}

/// Inner representation of the [`Tx`] client.
#[derive(Debug)]
struct Inner {
    /// [`NonTx`] client to start the [`connection::Tx`] in.
    non_tx: NonTx,

    /// Lazily started [`connection::Tx`].
    tx: RwLock<Option<connection::Tx>>,
}

impl Tx {
    /// Creates a new [`Tx`] client of the provided [`Mode`] from the provided
    /// [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx, mode: Mode) -> Self {
        Self {
            mode,
            inner: Arc::new(Inner {
                non_tx: client,
                tx: RwLock::new(None),
            }),
        }
    }

    /// Returns [`Mode`] of this [`Tx`] client.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns underlying [`Connection`] of this [`Tx`] client, starting the
    /// transaction if necessary.
    ///
    /// Reuses the [`Connection`] already acquired by the [`NonTx`] client, if
    /// any.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        super::get_or_try_init(&self.inner.tx, || async {
            let conn = match self.inner.non_tx.take_connection().await {
                Some(conn) => conn,
                None => self
                    .inner
                    .non_tx
                    .acquire()
                    .await
                    .map_err(tracerr::wrap!())?,
            };
            tracing::debug!(mode = ?self.mode, "starting transaction");
            connection::Tx::from_non_tx(conn, self.mode)
                .await
                .map_err(tracerr::wrap!())
        })
        .await
        .map_err(tracerr::wrap!())
    }

    /// Commits this [`Tx`] client.
    ///
    /// # Errors
    ///
    /// If failed to commit transaction of this [`Tx`] client.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        if let Some(tx) = self.inner.tx.write().await.take() {
            tx.commit().await.map_err(tracerr::wrap!())
        } else {
            // Transaction has never been started, so nothing to commit.
            Ok(())
        }
    }
}

connection::impl_connection!(traced Tx, |c| c
    .connection()
    .await
    .map_err(::tracerr::wrap!())?);
