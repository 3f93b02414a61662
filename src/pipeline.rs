//! Pipeline assembly and execution.
//!
//! A [`Pipeline`] owns a set of registered nodes and the edges between them.
//! Assembly (`add_node`, `connect`) is pure bookkeeping; `run` launches one
//! tokio task per node, `wait` is the completion barrier, and `stop`
//! broadcasts the shared cancellation token. Topology is immutable once the
//! pipeline is running, so no locking is needed anywhere in the engine.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, PortDirection, Result};
use crate::node::{InputPort, Node};

/// Opaque handle to a node registered with a [`Pipeline`].
///
/// Handles are only meaningful within the pipeline that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[cfg(test)]
    pub(crate) fn for_tests(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An owner and scheduler for a graph of [`Node`]s.
///
/// Every edge of one pipeline carries the same payload type `T`;
/// heterogeneous graphs use a caller-defined enum. The pipeline surfaces no
/// errors from node bodies — failure visibility, if wanted, is engineered
/// into `T` by the caller.
///
/// Lifecycle: created empty, then nodes and edges added, then [`run`] once,
/// then [`wait`] for the graph to drain. [`stop`] may fire at any point after
/// `run` to request cooperative cancellation. A second `run` is refused with
/// [`Error::AlreadyStarted`]: the first run's channels are consumed and
/// cannot be driven again.
///
/// [`run`]: Pipeline::run
/// [`wait`]: Pipeline::wait
/// [`stop`]: Pipeline::stop
pub struct Pipeline<T: Send + 'static> {
    nodes: Vec<Node<T>>,
    token: Option<CancellationToken>,
    handles: Vec<JoinHandle<()>>,
    /// Send halves backing input slots that were never connected. Parked so
    /// the slot blocks for the life of the run instead of reporting a close
    /// the engine never signalled.
    parked_senders: Vec<mpsc::Sender<T>>,
    /// Read ends of outputs nobody connected. Parked so writes to them block
    /// once the buffer fills rather than failing.
    parked_receivers: Vec<mpsc::Receiver<T>>,
}

impl<T: Send + 'static> Pipeline<T> {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            token: None,
            handles: Vec::new(),
            parked_senders: Vec::new(),
            parked_receivers: Vec::new(),
        }
    }

    /// Register a node and get back its handle.
    ///
    /// A node must be registered before any edge referencing it is created.
    /// Nodes run in no particular order relative to each other.
    pub fn add_node(&mut self, node: Node<T>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the pipeline has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create the edge `(src, src_port) -> (dst, dst_port)`.
    ///
    /// Edges are strict point-to-point bindings: each output port feeds at
    /// most one input port and each input port is fed by at most one output.
    /// Binding an already-bound port on either side is refused with a
    /// diagnostic rather than silently rewiring the graph, as is any port
    /// index outside the node's fixed arity. Must be called before [`run`].
    ///
    /// [`run`]: Pipeline::run
    pub fn connect(
        &mut self,
        src: NodeId,
        src_port: usize,
        dst: NodeId,
        dst_port: usize,
    ) -> Result<()> {
        if self.token.is_some() {
            return Err(Error::AlreadyStarted);
        }

        let src_node = self.nodes.get(src.0).ok_or(Error::UnknownNode(src))?;
        if src_port >= src_node.num_outputs() {
            return Err(Error::PortOutOfRange {
                node: src,
                port: src_port,
                arity: src_node.num_outputs(),
                direction: PortDirection::Output,
            });
        }

        let dst_node = self.nodes.get(dst.0).ok_or(Error::UnknownNode(dst))?;
        if dst_port >= dst_node.num_inputs() {
            return Err(Error::PortOutOfRange {
                node: dst,
                port: dst_port,
                arity: dst_node.num_inputs(),
                direction: PortDirection::Input,
            });
        }
        if dst_node.inputs[dst_port].is_some() {
            return Err(Error::InputAlreadyBound {
                node: dst,
                port: dst_port,
            });
        }

        // Checks done; takes below cannot leave the graph half-wired.
        let rx = self.nodes[src.0].taps[src_port]
            .take()
            .ok_or(Error::OutputAlreadyBound {
                node: src,
                port: src_port,
            })?;
        self.nodes[dst.0].inputs[dst_port] = Some(InputPort::new(rx));
        Ok(())
    }

    /// Launch every registered node as an independent tokio task.
    ///
    /// Returns immediately; use [`wait`] to block until the graph drains.
    /// Each task invokes its node's body with the run's shared cancellation
    /// token and the node's bound ports. When the body returns — or panics —
    /// its output ports drop and every output channel closes exactly once;
    /// that closure is the sole end-of-stream signal consumers observe.
    ///
    /// Input slots never targeted by [`connect`] stay open and empty for the
    /// whole run, so a body reading one blocks forever. That is the
    /// documented topology-defect hazard, deliberately not detected here.
    ///
    /// [`wait`]: Pipeline::wait
    /// [`connect`]: Pipeline::connect
    pub fn run(&mut self) -> Result<()> {
        if self.token.is_some() {
            return Err(Error::AlreadyStarted);
        }
        let token = CancellationToken::new();
        self.token = Some(token.clone());

        for index in 0..self.nodes.len() {
            let node = &mut self.nodes[index];
            let Some(mut body) = node.body.take() else {
                continue;
            };
            let bound = std::mem::take(&mut node.inputs);
            let outputs = std::mem::take(&mut node.outputs);
            let taps = std::mem::take(&mut node.taps);

            let mut inputs = Vec::with_capacity(bound.len());
            for slot in bound {
                match slot {
                    Some(port) => inputs.push(port),
                    None => {
                        let (tx, rx) = mpsc::channel(1);
                        self.parked_senders.push(tx);
                        inputs.push(InputPort::new(rx));
                    }
                }
            }
            self.parked_receivers.extend(taps.into_iter().flatten());

            tracing::debug!(
                node = index,
                inputs = inputs.len(),
                outputs = outputs.len(),
                "spawning node task"
            );
            let ctx = token.clone();
            self.handles.push(tokio::spawn(async move {
                body.run(ctx, inputs, outputs).await;
                tracing::trace!(node = index, "node body returned, outputs closed");
            }));
        }
        Ok(())
    }

    /// Block until every launched node's body has returned.
    ///
    /// Purely a synchronization rendez-vous: no values or errors are
    /// aggregated. A panicked body is logged and otherwise treated like a
    /// normal return, since its outputs closed the same way.
    pub async fn wait(&mut self) {
        let handles: Vec<_> = self.handles.drain(..).collect();
        for result in futures::future::join_all(handles).await {
            if let Err(err) = result {
                tracing::warn!(error = %err, "node task panicked");
            }
        }
    }

    /// Request cooperative cancellation of the current run.
    ///
    /// Fires the shared token and returns at once; it closes no channels and
    /// waits for nothing. A body that never polls the token while blocked on
    /// a channel will not notice. No-op before [`run`].
    ///
    /// [`run`]: Pipeline::run
    pub fn stop(&self) {
        if let Some(token) = &self.token {
            tracing::debug!("broadcasting cancellation to all nodes");
            token.cancel();
        }
    }
}

impl<T: Send + 'static> Default for Pipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}
