use std::future::Future;
use std::pin::Pin;

use tracing::error;

use crate::data::transaction::{UnitOfWork, WriteTransaction};
use crate::domain::error::DomainError;

pub(crate) type TxFuture<'t, T> = Pin<Box<dyn Future<Output = Result<T, DomainError>> + Send + 't>>;

/// Runs `work` inside one transaction: commit on success, rollback on failure.
/// A failed rollback is reported together with the error that caused it.
pub(crate) async fn execute_atomic<U, T, F>(uow: &U, work: F) -> Result<T, DomainError>
where
    U: UnitOfWork,
    T: Send,
    F: for<'t> FnOnce(&'t mut U::Tx) -> TxFuture<'t, T> + Send,
{
    let mut tx = uow.begin().await?;

    match work(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => match tx.rollback().await {
            Ok(()) => Err(err),
            Err(rollback) => {
                error!(error = %err, rollback_error = %rollback, "transaction rollback failed");
                Err(DomainError::RollbackFailed {
                    source: Box::new(err),
                    rollback: Box::new(rollback),
                })
            }
        },
    }
}
