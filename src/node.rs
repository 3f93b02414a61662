//! Nodes, ports, and the body contract.
//!
//! A [`Node`] is a fixed-arity unit of work. Its output channels are created
//! live at construction time, before anything is connected to them; its input
//! slots are placeholders filled by [`Pipeline::connect`]. The body runs
//! exactly once per pipeline execution and owns its ports for the duration of
//! that run: when it returns (or panics), the ports drop and every output
//! channel closes. That closure is the engine's only end-of-stream signal.
//!
//! [`Pipeline::connect`]: crate::pipeline::Pipeline::connect

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Default capacity of a node's output channels.
///
/// tokio channels have no zero-capacity rendezvous mode, so a one-slot buffer
/// is the closest available approximation of a blocking hand-off: a producer
/// runs at most one item ahead of its consumer. Use [`Node::with_buffer`] to
/// decouple producer and consumer pacing.
pub const DEFAULT_PORT_CAPACITY: usize = 1;

/// The read end of an edge, held by the consuming node's body.
pub struct InputPort<T> {
    rx: mpsc::Receiver<T>,
}

impl<T: Send + 'static> InputPort<T> {
    pub(crate) fn new(rx: mpsc::Receiver<T>) -> Self {
        Self { rx }
    }

    /// Receive the next item, or `None` once the producing side has returned
    /// and the channel is drained.
    ///
    /// An input slot that was never bound to a producer blocks here for the
    /// lifetime of the run. The engine does not detect that topology defect;
    /// pair this call with the cancellation token in a `select!` if the body
    /// must stay stoppable.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Adapt this port into a [`Stream`](tokio_stream::Stream) of items.
    pub fn into_stream(self) -> ReceiverStream<T> {
        ReceiverStream::new(self.rx)
    }
}

/// The write end of an edge, owned by the producing node.
///
/// Cloning is allowed so a body can fan work out to its own sub-tasks; the
/// channel closes once every clone has dropped. A body that spawns sub-tasks
/// must join them before returning, otherwise writes race the end of the run.
pub struct OutputPort<T> {
    tx: mpsc::Sender<T>,
}

impl<T> Clone for OutputPort<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send + 'static> OutputPort<T> {
    pub(crate) fn new(tx: mpsc::Sender<T>) -> Self {
        Self { tx }
    }

    /// Send one item downstream, waiting for buffer space.
    ///
    /// Fails with [`Error::ChannelClosed`] if the consumer dropped its read
    /// end early; most bodies treat that as an ordinary reason to stop
    /// producing.
    pub async fn send(&self, item: T) -> Result<()> {
        self.tx.send(item).await.map_err(|_| Error::ChannelClosed)
    }
}

/// The work a node performs, invoked by the pipeline, never by the end user.
///
/// The body receives the shared cancellation token, its bound input read
/// ends, and its output write ends. It may read and write as much or as
/// little as it likes, and may run internal concurrency of its own, provided
/// it observes the token at blocking points and drains its own sub-tasks
/// before returning. Bodies do not return errors to the engine: a failure
/// that ends a body early looks downstream like ordinary stream termination.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use flowgraph::node::{InputPort, NodeBody, OutputPort};
/// use tokio_util::sync::CancellationToken;
///
/// struct Echo;
///
/// #[async_trait]
/// impl NodeBody<String> for Echo {
///     async fn run(
///         &mut self,
///         ctx: CancellationToken,
///         mut inputs: Vec<InputPort<String>>,
///         outputs: Vec<OutputPort<String>>,
///     ) {
///         let mut input = inputs.remove(0);
///         while let Some(item) = input.recv().await {
///             tokio::select! {
///                 _ = ctx.cancelled() => return,
///                 res = outputs[0].send(item) => if res.is_err() { return },
///             }
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait NodeBody<T: Send + 'static>: Send {
    /// Run the node to completion. Called exactly once per pipeline run.
    async fn run(
        &mut self,
        ctx: CancellationToken,
        inputs: Vec<InputPort<T>>,
        outputs: Vec<OutputPort<T>>,
    );
}

/// A fixed-arity processing step in a dataflow graph.
///
/// Arities never change after construction. The output channels exist from
/// this point on, whether or not a consumer is ever connected; an output
/// nobody taps will block its writer once the buffer fills, exactly like the
/// unbound-input hazard on the read side.
pub struct Node<T: Send + 'static> {
    num_in: usize,
    num_out: usize,
    pub(crate) inputs: Vec<Option<InputPort<T>>>,
    pub(crate) outputs: Vec<OutputPort<T>>,
    /// Read ends of this node's own outputs, taken one by one by `connect`.
    pub(crate) taps: Vec<Option<mpsc::Receiver<T>>>,
    pub(crate) body: Option<Box<dyn NodeBody<T>>>,
}

impl<T: Send + 'static> Node<T> {
    /// Create a node with `num_in` input slots and `num_out` live output
    /// channels of [`DEFAULT_PORT_CAPACITY`].
    pub fn new(num_in: usize, num_out: usize, body: impl NodeBody<T> + 'static) -> Self {
        Self::with_buffer(num_in, num_out, DEFAULT_PORT_CAPACITY, body)
    }

    /// Create a node whose output channels buffer up to `capacity` items,
    /// decoupling this node's pacing from its consumers'. A `capacity` of
    /// zero is clamped to one.
    pub fn with_buffer(
        num_in: usize,
        num_out: usize,
        capacity: usize,
        body: impl NodeBody<T> + 'static,
    ) -> Self {
        let capacity = capacity.max(1);
        let mut outputs = Vec::with_capacity(num_out);
        let mut taps = Vec::with_capacity(num_out);
        for _ in 0..num_out {
            let (tx, rx) = mpsc::channel(capacity);
            outputs.push(OutputPort::new(tx));
            taps.push(Some(rx));
        }
        Self {
            num_in,
            num_out,
            inputs: (0..num_in).map(|_| None).collect(),
            outputs,
            taps,
            body: Some(Box::new(body)),
        }
    }

    /// Number of input slots, fixed at construction.
    pub fn num_inputs(&self) -> usize {
        self.num_in
    }

    /// Number of output channels, fixed at construction.
    pub fn num_outputs(&self) -> usize {
        self.num_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::body_from_fn;

    fn noop_node(num_in: usize, num_out: usize) -> Node<u32> {
        Node::new(
            num_in,
            num_out,
            body_from_fn(|_ctx, _inputs, _outputs| async {}),
        )
    }

    #[test]
    fn arities_match_construction() {
        let node = noop_node(2, 3);
        assert_eq!(node.num_inputs(), 2);
        assert_eq!(node.num_outputs(), 3);
        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.outputs.len(), 3);
        assert_eq!(node.taps.len(), 3);
    }

    #[test]
    fn outputs_are_live_at_construction() {
        let node = noop_node(0, 1);
        // The write end exists before anything is connected.
        assert!(node.taps[0].is_some());
        assert!(node.body.is_some());
    }

    #[tokio::test]
    async fn output_send_fails_after_reader_drops() {
        let mut node = noop_node(0, 1);
        drop(node.taps[0].take());
        let err = node.outputs[0].send(7).await.unwrap_err();
        assert_eq!(err, Error::ChannelClosed);
    }
}
