// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! The outcome of a deadline-bound [crate::rpc::call]

/// The result from a [crate::rpc::call] operation
#[derive(Debug, Eq, PartialEq)]
pub enum CallResult<TResult> {
    /// Success, with the result
    Success(TResult),
    /// The deadline elapsed first. The handler keeps running, its result is dropped.
    Timeout,
    /// The reply port was dropped without any message being sent
    SenderError,
}

impl<T> CallResult<T> {
    /// Determine if the [CallResult] is a [CallResult::Timeout]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Determine if the [CallResult] is a [CallResult::SenderError]
    pub fn is_send_error(&self) -> bool {
        matches!(self, Self::SenderError)
    }

    /// Unwrap a [CallResult], panicking on any non-success
    pub fn unwrap(self) -> T {
        match self {
            Self::Success(t) => t,
            Self::Timeout => panic!("called CallResult::<T>::unwrap() on a `Timeout` value"),
            Self::SenderError => {
                panic!("called CallResult::<T>::unwrap() on a `SenderError` value")
            }
        }
    }

    /// Returns the [CallResult]'s success result or computes the closure
    /// over the failed outcome
    pub fn unwrap_or_else<F>(self, f: F) -> T
    where
        F: FnOnce(CallResult<T>) -> T,
    {
        match self {
            Self::Success(t) => t,
            other => f(other),
        }
    }

    /// Maps the success value of the [CallResult] to another type
    pub fn map<O, F>(self, mapping: F) -> CallResult<O>
    where
        F: FnOnce(T) -> O,
    {
        match self {
            Self::Success(t) => CallResult::Success(mapping(t)),
            Self::Timeout => CallResult::Timeout,
            Self::SenderError => CallResult::SenderError,
        }
    }
}
