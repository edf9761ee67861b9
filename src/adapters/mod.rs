use std::sync::PoisonError;

use crate::{domain::IdsExhausted, ports};

pub mod advice;
pub mod catalog;
pub mod identity;
pub mod schedule;

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for ports::schedule::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for ports::identity::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for ports::advice::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl From<IdsExhausted> for ports::schedule::Error {
    fn from(err: IdsExhausted) -> Self {
        Self::Adapter(Box::new(err))
    }
}

impl From<IdsExhausted> for ports::identity::Error {
    fn from(err: IdsExhausted) -> Self {
        Self::Adapter(Box::new(err))
    }
}

impl From<IdsExhausted> for ports::advice::Error {
    fn from(err: IdsExhausted) -> Self {
        Self::Adapter(Box::new(err))
    }
}
