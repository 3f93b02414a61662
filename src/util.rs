//! Utility adapters for building node bodies.

use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::node::{InputPort, NodeBody, OutputPort};

/// Helper function to create a node body from an async closure.
///
/// The closure receives the cancellation token, the bound input ports, and
/// the output ports, exactly like a hand-written [`NodeBody`] impl.
///
/// # Examples
///
/// ```rust
/// use flowgraph::prelude::*;
///
/// let body = body_from_fn(|_ctx, _inputs, outputs: Vec<OutputPort<u32>>| async move {
///     let _ = outputs[0].send(42).await;
/// });
/// let node = Node::new(0, 1, body);
/// assert_eq!(node.num_outputs(), 1);
/// ```
pub fn body_from_fn<F, Fut, T>(f: F) -> FnBody<F, Fut, T>
where
    F: FnOnce(CancellationToken, Vec<InputPort<T>>, Vec<OutputPort<T>>) -> Fut + Send,
    Fut: Future<Output = ()> + Send,
    T: Send + 'static,
{
    FnBody {
        f: Some(f),
        _phantom: std::marker::PhantomData,
    }
}

/// A node body created from a closure.
///
/// Bodies run exactly once per pipeline execution, so the closure is
/// `FnOnce` and free to move captured state into its future.
pub struct FnBody<F, Fut, T>
where
    F: FnOnce(CancellationToken, Vec<InputPort<T>>, Vec<OutputPort<T>>) -> Fut + Send,
    Fut: Future<Output = ()> + Send,
    T: Send + 'static,
{
    f: Option<F>,
    _phantom: std::marker::PhantomData<(Fut, T)>,
}

#[async_trait]
impl<F, Fut, T> NodeBody<T> for FnBody<F, Fut, T>
where
    F: FnOnce(CancellationToken, Vec<InputPort<T>>, Vec<OutputPort<T>>) -> Fut + Send,
    Fut: Future<Output = ()> + Send,
    T: Send + 'static,
{
    async fn run(
        &mut self,
        ctx: CancellationToken,
        inputs: Vec<InputPort<T>>,
        outputs: Vec<OutputPort<T>>,
    ) {
        if let Some(f) = self.f.take() {
            f(ctx, inputs, outputs).await;
        }
    }
}
