//! Error types for the dataflow engine.
//!
//! Every error here is a graph-assembly or lifecycle contract violation.
//! Node bodies never return errors to the engine; any failure inside a body
//! is that body's own business and, if it must be visible downstream, belongs
//! in the payload type (e.g. a `Result`-shaped variant flowing along the
//! same edges).

use thiserror::Error;

use crate::pipeline::NodeId;

/// Which side of a node a port index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

impl std::fmt::Display for PortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortDirection::Input => write!(f, "input"),
            PortDirection::Output => write!(f, "output"),
        }
    }
}

/// The main error type for the dataflow engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A node handle does not belong to this pipeline
    #[error("unknown node handle {0}")]
    UnknownNode(NodeId),

    /// A port index exceeds the node's fixed arity
    #[error("{direction} port {port} out of range for node {node} (arity {arity})")]
    PortOutOfRange {
        node: NodeId,
        port: usize,
        arity: usize,
        direction: PortDirection,
    },

    /// The destination input port already has a producer bound to it
    #[error("input port {port} of node {node} is already bound")]
    InputAlreadyBound { node: NodeId, port: usize },

    /// The source output port already feeds another consumer
    #[error("output port {port} of node {node} is already connected")]
    OutputAlreadyBound { node: NodeId, port: usize },

    /// `run` was called on a pipeline that is already running or has run
    #[error("pipeline has already been started")]
    AlreadyStarted,

    /// A send hit a channel whose consumer is gone
    #[error("channel closed: receiver dropped before the stream drained")]
    ChannelClosed,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, Error>;
