//! Stock node bodies.
//!
//! Concrete [`NodeBody`] implementations for the common graph roles: sources
//! fed by iterators, single-input transforms, and collecting/counting/printing
//! sinks. All of them poll the shared cancellation token at every blocking
//! point and treat a closed downstream channel as an ordinary reason to stop.
//!
//! Each body works on port 0 of whichever side it uses; extra ports are left
//! untouched. Fan-in and fan-out beyond that is the domain of hand-written
//! bodies.

use async_trait::async_trait;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;
use tokio_util::sync::CancellationToken;

use crate::node::{InputPort, NodeBody, OutputPort};

/// A source body (`0 -> 1`) that emits the items of an iterator in order.
pub struct IterSource<I> {
    iter: I,
}

impl<I: Iterator> IterSource<I> {
    /// Create a source that drains `iter` into output port 0.
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: iter.into_iter(),
        }
    }
}

#[async_trait]
impl<I, T> NodeBody<T> for IterSource<I>
where
    I: Iterator<Item = T> + Send,
    T: Send + 'static,
{
    async fn run(
        &mut self,
        ctx: CancellationToken,
        _inputs: Vec<InputPort<T>>,
        outputs: Vec<OutputPort<T>>,
    ) {
        let Some(out) = outputs.into_iter().next() else {
            return;
        };
        for item in self.iter.by_ref() {
            tokio::select! {
                _ = ctx.cancelled() => return,
                res = out.send(item) => {
                    if res.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

/// A transform body (`1 -> 1`) that maps every item through a function.
///
/// The engine carries one payload type per graph, so the function maps
/// `T -> T`; graphs whose stages change shape use an enum payload and map
/// between its variants.
pub struct MapBody<F> {
    f: F,
}

impl<F> MapBody<F> {
    /// Create a mapping body from a function.
    pub fn new<T>(f: F) -> Self
    where
        F: FnMut(T) -> T,
    {
        Self { f }
    }
}

#[async_trait]
impl<F, T> NodeBody<T> for MapBody<F>
where
    F: FnMut(T) -> T + Send,
    T: Send + 'static,
{
    async fn run(
        &mut self,
        ctx: CancellationToken,
        mut inputs: Vec<InputPort<T>>,
        outputs: Vec<OutputPort<T>>,
    ) {
        let (Some(input), Some(out)) = (inputs.first_mut(), outputs.first()) else {
            return;
        };
        loop {
            let item = tokio::select! {
                _ = ctx.cancelled() => return,
                item = input.recv() => item,
            };
            let Some(item) = item else {
                return;
            };
            let mapped = (self.f)(item);
            tokio::select! {
                _ = ctx.cancelled() => return,
                res = out.send(mapped) => {
                    if res.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

/// A transform body (`1 -> 1`) that forwards only items matching a predicate.
pub struct FilterBody<F> {
    predicate: F,
}

impl<F> FilterBody<F> {
    /// Create a filtering body from a predicate.
    pub fn new<T>(predicate: F) -> Self
    where
        F: FnMut(&T) -> bool,
    {
        Self { predicate }
    }
}

#[async_trait]
impl<F, T> NodeBody<T> for FilterBody<F>
where
    F: FnMut(&T) -> bool + Send,
    T: Send + 'static,
{
    async fn run(
        &mut self,
        ctx: CancellationToken,
        mut inputs: Vec<InputPort<T>>,
        outputs: Vec<OutputPort<T>>,
    ) {
        let (Some(input), Some(out)) = (inputs.first_mut(), outputs.first()) else {
            return;
        };
        loop {
            let item = tokio::select! {
                _ = ctx.cancelled() => return,
                item = input.recv() => item,
            };
            let Some(item) = item else {
                return;
            };
            if !(self.predicate)(&item) {
                continue;
            }
            tokio::select! {
                _ = ctx.cancelled() => return,
                res = out.send(item) => {
                    if res.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

/// A sink body (`1 -> 0`) that collects items into a shared vector.
///
/// Clone the body (or keep the handle from [`items`]) before moving it into
/// a node; the clone reads the collected items after the run.
///
/// [`items`]: CollectBody::items
pub struct CollectBody<T> {
    items: Arc<TokioMutex<Vec<T>>>,
}

impl<T: Send + 'static> CollectBody<T> {
    /// Create a new collecting sink.
    pub fn new() -> Self {
        Self {
            items: Arc::new(TokioMutex::new(Vec::new())),
        }
    }

    /// Shared handle to the collected items.
    pub fn items(&self) -> Arc<TokioMutex<Vec<T>>> {
        self.items.clone()
    }
}

impl<T: Send + 'static> Default for CollectBody<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CollectBody<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> NodeBody<T> for CollectBody<T> {
    async fn run(
        &mut self,
        ctx: CancellationToken,
        mut inputs: Vec<InputPort<T>>,
        _outputs: Vec<OutputPort<T>>,
    ) {
        let Some(input) = inputs.first_mut() else {
            return;
        };
        loop {
            let item = tokio::select! {
                _ = ctx.cancelled() => return,
                item = input.recv() => item,
            };
            let Some(item) = item else {
                return;
            };
            self.items.lock().await.push(item);
        }
    }
}

/// A sink body (`1 -> 0`) that counts items.
pub struct CountBody<T> {
    count: Arc<TokioMutex<usize>>,
    _phantom: PhantomData<fn(T)>,
}

impl<T: Send + 'static> CountBody<T> {
    /// Create a new counting sink.
    pub fn new() -> Self {
        Self {
            count: Arc::new(TokioMutex::new(0)),
            _phantom: PhantomData,
        }
    }

    /// The number of items seen so far.
    pub async fn count(&self) -> usize {
        *self.count.lock().await
    }
}

impl<T: Send + 'static> Default for CountBody<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CountBody<T> {
    fn clone(&self) -> Self {
        Self {
            count: self.count.clone(),
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Send + 'static> NodeBody<T> for CountBody<T> {
    async fn run(
        &mut self,
        ctx: CancellationToken,
        mut inputs: Vec<InputPort<T>>,
        _outputs: Vec<OutputPort<T>>,
    ) {
        let Some(input) = inputs.first_mut() else {
            return;
        };
        loop {
            let item = tokio::select! {
                _ = ctx.cancelled() => return,
                item = input.recv() => item,
            };
            if item.is_none() {
                return;
            }
            *self.count.lock().await += 1;
        }
    }
}

/// A sink body (`1 -> 0`) that prints items to stdout.
pub struct PrintBody<T> {
    prefix: Option<String>,
    _phantom: PhantomData<fn(T)>,
}

impl<T> PrintBody<T> {
    /// Create a new printing sink.
    pub fn new() -> Self {
        Self {
            prefix: None,
            _phantom: PhantomData,
        }
    }

    /// Create a printing sink that writes `prefix` before each item.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            _phantom: PhantomData,
        }
    }
}

impl<T> Default for PrintBody<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Send + 'static + Display> NodeBody<T> for PrintBody<T> {
    async fn run(
        &mut self,
        ctx: CancellationToken,
        mut inputs: Vec<InputPort<T>>,
        _outputs: Vec<OutputPort<T>>,
    ) {
        let Some(input) = inputs.first_mut() else {
            return;
        };
        loop {
            let item = tokio::select! {
                _ = ctx.cancelled() => return,
                item = input.recv() => item,
            };
            let Some(item) = item else {
                return;
            };
            match &self.prefix {
                Some(prefix) => println!("{}: {}", prefix, item),
                None => println!("{}", item),
            }
        }
    }
}
