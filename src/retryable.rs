use crate::error::AttemptError;
use async_std::task::JoinHandle;
use futures::{
    future::{self, BoxFuture, Ready},
    FutureExt,
};
use std::{fmt, future::Future, panic::AssertUnwindSafe};

pub trait Retryable {
    //! one unit of work the loop can invoke over and over
    //! every closure `FnMut() -> R` is one already, where `R` is either a plain `Result`
    //! (the work is done by the time the closure returns) or a `Deferred`
    //! (the work finishes later and the loop waits for it)
    //! a unit of work with one argument goes through `with_arg`
    //! work that produces nothing just uses `()` as its output
    type Output;
    type Error;
    type Attempt: IntoAttempt<Output = Self::Output, Error = Self::Error>;
    fn try_once(&mut self) -> Self::Attempt;
}

impl<F, A> Retryable for F
where
    F: FnMut() -> A,
    A: IntoAttempt,
{
    type Output = A::Output;
    type Error = A::Error;
    type Attempt = A;

    fn try_once(&mut self) -> A {
        self()
    }
}

/// The one-argument shape, see [`with_arg`].
#[derive(Clone, Debug)]
pub struct WithArg<Arg, F> {
    arg: Arg,
    f: F,
}

/// Bind `arg` to a one-argument operation.
/// Every attempt gets its own clone of the value given here, so all attempts see the same argument.
pub fn with_arg<Arg, F, A>(arg: Arg, f: F) -> WithArg<Arg, F>
where
    Arg: Clone,
    F: FnMut(Arg) -> A,
    A: IntoAttempt,
{
    WithArg { arg, f }
}

impl<Arg, F, A> Retryable for WithArg<Arg, F>
where
    Arg: Clone,
    F: FnMut(Arg) -> A,
    A: IntoAttempt,
{
    type Output = A::Output;
    type Error = A::Error;
    type Attempt = A;

    fn try_once(&mut self) -> A {
        (self.f)(self.arg.clone())
    }
}

/// What one invocation of an operation hands back to the loop.
///
/// `settle` resolves once the attempt is over: the inner `Result` is the
/// operation's own verdict, the outer one covers a deferred computation that
/// died before producing a verdict.
pub trait IntoAttempt {
    type Output;
    type Error;
    type Settle: Future<Output = Result<Result<Self::Output, Self::Error>, AttemptError>>;
    fn settle(self) -> Self::Settle;
}

impl<T, E> IntoAttempt for Result<T, E> {
    type Output = T;
    type Error = E;
    type Settle = Ready<Result<Result<T, E>, AttemptError>>;

    fn settle(self) -> Self::Settle {
        future::ready(Ok(self))
    }
}

impl<T, E> IntoAttempt for Deferred<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;
    type Settle = BoxFuture<'static, Result<Result<T, E>, AttemptError>>;

    fn settle(self) -> Self::Settle {
        self.join().boxed()
    }
}

/// A computation whose completion is observed apart from its invocation.
///
/// It is either still unscheduled ([`Deferred::lazy`]) or already running on
/// the async-std executor ([`Deferred::spawn`]). Waiting on it through
/// [`Deferred::join`] schedules an unscheduled one first; a running one is
/// awaited as it is and never scheduled a second time.
///
/// Both states run on the async-std executor, so the computation has to be
/// `Send + 'static` and cannot borrow from the caller, even when the caller
/// drives the loop itself. Work that needs borrowed state should finish inside
/// the operation and return a plain `Result` instead.
pub struct Deferred<T, E> {
    state: State<T, E>,
}

enum State<T, E> {
    Unstarted(BoxFuture<'static, Result<T, E>>),
    Started(JoinHandle<std::thread::Result<Result<T, E>>>),
}

impl<T, E> Deferred<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn lazy<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            state: State::Unstarted(fut.boxed()),
        }
    }

    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::lazy(fut).start()
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        matches!(self.state, State::Started(_))
    }

    /// schedule the computation if nobody did yet
    #[must_use]
    pub fn start(self) -> Self {
        Self {
            state: State::Started(self.into_handle()),
        }
    }

    pub async fn join(self) -> Result<Result<T, E>, AttemptError> {
        self.into_handle()
            .await
            .map_err(|payload| AttemptError::from_panic(payload.as_ref()))
    }

    fn into_handle(self) -> JoinHandle<std::thread::Result<Result<T, E>>> {
        match self.state {
            State::Started(handle) => handle,
            State::Unstarted(fut) => {
                tracing::trace!("scheduling deferred attempt");
                async_std::task::spawn(AssertUnwindSafe(fut).catch_unwind())
            }
        }
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("started", &matches!(self.state, State::Started(_)))
            .finish()
    }
}
