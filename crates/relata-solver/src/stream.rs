//! Lazy, fair streams of contexts.
//!
//! A [`Stream`] is the answer of a goal: a possibly infinite sequence of
//! contexts, each one a branch on which the goal holds. Streams are lazy.
//! A [`Stream::Suspended`] tail is only computed when the consumer forces
//! it, and forcing a suspension is the unit of work the query driver counts
//! as a step.
//!
//! Conjunction is [`Stream::bind`]: every context of the left stream is fed
//! into the right goal and the resulting streams are concatenated in order.
//! Disjunction is [`Stream::interleave`]: branches take turns, and each
//! turn forces at most one suspension of one branch before control returns
//! to the consumer, so a branch that recurses forever cannot starve its
//! siblings.
//!
//! # Example
//!
//! ```
//! use relata_core::Context;
//! use relata_solver::stream::Stream;
//!
//! let slow = Stream::suspend(|| Stream::suspend(|| Stream::unit(Context::new())));
//! let fast = Stream::unit(Context::new());
//!
//! let mut answers = Stream::interleave(vec![slow, fast]).contexts();
//! assert!(answers.next().is_some());
//! assert_eq!(answers.steps(), 0);
//! assert!(answers.next().is_some());
//! assert_eq!(answers.steps(), 2);
//! ```

use std::collections::VecDeque;
use std::fmt;

use relata_core::{Context, CoreError};

use crate::error::SolverError;
use crate::goal::GoalRef;

/// A deferred stream computation.
pub type Thunk = Box<dyn FnOnce() -> Stream + Send>;

/// A fatal invariant violation travelling through a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub subject: String,
    pub message: String,
}

impl Fault {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

impl From<Fault> for SolverError {
    fn from(fault: Fault) -> Self {
        SolverError::Invariant {
            subject: fault.subject,
            message: fault.message,
        }
    }
}

impl From<CoreError> for Fault {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::FacetCollision { name, .. } => {
                Fault::new(format!("facet `{name}`"), err.to_string())
            }
        }
    }
}

/// A lazy sequence of contexts.
pub enum Stream {
    Empty,
    Cons(Context, Tail),
    Suspended(Thunk),
    Abort(Fault),
}

/// The rest of a [`Stream::Cons`].
///
/// Dropping a tail unlinks ready contexts one by one, so a long run of
/// answers left unconsumed is released without deep recursion.
pub struct Tail(Box<Stream>);

impl Tail {
    pub fn new(stream: Stream) -> Self {
        Tail(Box::new(stream))
    }

    pub fn into_inner(mut self) -> Stream {
        std::mem::replace(&mut *self.0, Stream::Empty)
    }
}

impl Drop for Tail {
    fn drop(&mut self) {
        let mut next = std::mem::replace(&mut *self.0, Stream::Empty);
        loop {
            match next {
                Stream::Cons(ctx, tail) => {
                    drop(ctx);
                    next = tail.into_inner();
                }
                _ => break,
            }
        }
    }
}

impl fmt::Debug for Tail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The result of advancing a stream by one move.
#[derive(Debug)]
pub enum Step {
    /// A context is available; the rest follows.
    Yield(Context, Stream),
    /// A suspension was forced.
    Forced(Stream),
    /// The stream is exhausted.
    Done,
    /// The stream aborted.
    Fault(Fault),
}

impl Stream {
    pub fn empty() -> Self {
        Stream::Empty
    }

    /// A stream of exactly one context.
    pub fn unit(ctx: Context) -> Self {
        Stream::Cons(ctx, Tail::new(Stream::Empty))
    }

    pub fn cons(ctx: Context, rest: Stream) -> Self {
        Stream::Cons(ctx, Tail::new(rest))
    }

    /// Defers `f` until the consumer forces it.
    pub fn suspend(f: impl FnOnce() -> Stream + Send + 'static) -> Self {
        Stream::Suspended(Box::new(f))
    }

    pub fn abort(fault: Fault) -> Self {
        Stream::Abort(fault)
    }

    /// A lazy stream over `iter`, pulling one item per forced suspension.
    ///
    /// A filtering iterator may consume several source items in one pull.
    ///
    /// An `Err` item aborts the stream.
    pub fn from_results<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<Context, Fault>> + Send + 'static,
    {
        Stream::suspend(move || Self::pull_next(iter))
    }

    fn pull_next<I>(mut iter: I) -> Self
    where
        I: Iterator<Item = Result<Context, Fault>> + Send + 'static,
    {
        match iter.next() {
            None => Stream::Empty,
            Some(Ok(ctx)) => Stream::cons(ctx, Stream::suspend(move || Self::pull_next(iter))),
            Some(Err(fault)) => Stream::Abort(fault),
        }
    }

    /// A lazy stream over contexts.
    pub fn from_contexts<I>(iter: I) -> Self
    where
        I: Iterator<Item = Context> + Send + 'static,
    {
        Self::from_results(iter.map(Ok))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Stream::Empty)
    }

    /// Advances the stream by one move, forcing at most one suspension.
    pub fn step(self) -> Step {
        match self {
            Stream::Empty => Step::Done,
            Stream::Cons(ctx, rest) => Step::Yield(ctx, rest.into_inner()),
            Stream::Suspended(thunk) => Step::Forced(thunk()),
            Stream::Abort(fault) => Step::Fault(fault),
        }
    }

    /// Concatenates `other` after this stream.
    pub fn append(self, other: Stream) -> Stream {
        self.append_with(move || other)
    }

    /// Concatenates the stream produced by `next` after this stream,
    /// computing it only once this stream is exhausted.
    pub fn append_with(self, next: impl FnOnce() -> Stream + Send + 'static) -> Stream {
        let mut heads = Vec::new();
        let mut current = self;
        loop {
            match current {
                Stream::Cons(ctx, rest) => {
                    heads.push(ctx);
                    current = rest.into_inner();
                }
                Stream::Empty if heads.is_empty() => return next(),
                Stream::Empty => return chain(heads, Stream::suspend(next)),
                Stream::Suspended(thunk) => {
                    return chain(heads, Stream::suspend(move || thunk().append_with(next)));
                }
                Stream::Abort(fault) => return chain(heads, Stream::Abort(fault)),
            }
        }
    }

    /// Feeds every context of this stream into `goal`, concatenating the
    /// answers in this stream's order.
    pub fn bind(self, goal: GoalRef) -> Stream {
        let mut current = self;
        loop {
            match current {
                Stream::Empty => return Stream::Empty,
                Stream::Abort(fault) => return Stream::Abort(fault),
                Stream::Suspended(thunk) => {
                    return Stream::suspend(move || thunk().bind(goal));
                }
                Stream::Cons(ctx, rest) => {
                    let answers = goal.apply(ctx);
                    if answers.is_empty() {
                        current = rest.into_inner();
                        continue;
                    }
                    return answers.append_with(move || rest.into_inner().bind(goal));
                }
            }
        }
    }

    /// Interleaves `streams` round-robin.
    ///
    /// Contexts that are already available are yielded first, branch by
    /// branch. When every live branch is suspended, the returned stream
    /// forces the front branch once, moves it to the back and hands
    /// control back to the consumer.
    pub fn interleave(streams: Vec<Stream>) -> Stream {
        round_robin(streams.into_iter().collect())
    }

    /// Binary interleave.
    pub fn mplus(self, other: Stream) -> Stream {
        Self::interleave(vec![self, other])
    }

    /// Iterates over the contexts, forcing suspensions as needed.
    pub fn contexts(self) -> Contexts {
        Contexts {
            stream: Some(self),
            steps: 0,
        }
    }
}

fn chain(heads: Vec<Context>, tail: Stream) -> Stream {
    heads
        .into_iter()
        .rev()
        .fold(tail, |rest, ctx| Stream::cons(ctx, rest))
}

fn round_robin(mut queue: VecDeque<Stream>) -> Stream {
    let mut heads = Vec::new();
    while let Some(front) = queue.pop_front() {
        match front {
            Stream::Empty => {}
            Stream::Cons(ctx, rest) => {
                heads.push(ctx);
                queue.push_back(rest.into_inner());
            }
            Stream::Abort(fault) => return chain(heads, Stream::Abort(fault)),
            Stream::Suspended(thunk) => {
                if queue.is_empty() {
                    return chain(heads, Stream::Suspended(thunk));
                }
                if queue.iter().all(|s| matches!(s, Stream::Suspended(_))) {
                    let tail = Stream::suspend(move || {
                        queue.push_back(thunk());
                        round_robin(queue)
                    });
                    return chain(heads, tail);
                }
                queue.push_back(Stream::Suspended(thunk));
            }
        }
    }
    chain(heads, Stream::Empty)
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Empty => f.write_str("Empty"),
            Stream::Cons(ctx, rest) => f.debug_tuple("Cons").field(ctx).field(rest).finish(),
            Stream::Suspended(_) => f.write_str("Suspended(..)"),
            Stream::Abort(fault) => f.debug_tuple("Abort").field(fault).finish(),
        }
    }
}

/// Iterator over the contexts of a stream.
///
/// Ends after yielding a fault.
pub struct Contexts {
    stream: Option<Stream>,
    steps: u64,
}

impl Contexts {
    /// Suspensions forced so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Iterator for Contexts {
    type Item = Result<Context, Fault>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stream.take()?.step() {
                Step::Done => return None,
                Step::Yield(ctx, rest) => {
                    self.stream = Some(rest);
                    return Some(Ok(ctx));
                }
                Step::Forced(next) => {
                    self.steps += 1;
                    self.stream = Some(next);
                }
                Step::Fault(fault) => return Some(Err(fault)),
            }
        }
    }
}

impl fmt::Debug for Contexts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contexts")
            .field("steps", &self.steps)
            .field("exhausted", &self.stream.is_none())
            .finish()
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
