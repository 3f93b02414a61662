//! # Channel-Based Dataflow Graph Engine
//!
//! This crate provides a small dataflow engine: a directed graph of processing
//! nodes with fixed input/output arities, connected by point-to-point FIFO
//! channels, executed as one concurrent task per node until the graph drains
//! or is cancelled.
//!
//! ## Core Concepts
//!
//! - **Node**: A unit of work with a fixed number of input and output ports,
//!   driven by a caller-supplied body
//! - **Port**: One end of a bounded channel; inputs are read ends, outputs
//!   are write ends
//! - **Pipeline**: Owns the nodes and edges, runs every node concurrently,
//!   and broadcasts a single cooperative cancellation signal
//!
//! Payloads are typed per graph: every edge of a `Pipeline<T>` carries `T`.
//! Heterogeneous graphs use a caller-defined enum as `T`.
//!
//! ## Example
//!
//! ```rust
//! use flowgraph::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut pipeline = Pipeline::new();
//!
//!     let source = pipeline.add_node(Node::new(0, 1, IterSource::new(1..4)));
//!     let double = pipeline.add_node(Node::new(1, 1, MapBody::new(|x: i32| x * 2)));
//!     let collect = CollectBody::new();
//!     let items = collect.items();
//!     let sink = pipeline.add_node(Node::new(1, 0, collect));
//!
//!     pipeline.connect(source, 0, double, 0)?;
//!     pipeline.connect(double, 0, sink, 0)?;
//!
//!     pipeline.run()?;
//!     pipeline.wait().await;
//!
//!     assert_eq!(*items.lock().await, vec![2, 4, 6]);
//!     Ok(())
//! }
//! ```

pub mod bodies;
pub mod error;
pub mod node;
pub mod pipeline;
pub mod util;

// Re-export commonly used items
pub mod prelude {
    pub use crate::bodies::{
        CollectBody, CountBody, FilterBody, IterSource, MapBody, PrintBody,
    };
    pub use crate::error::{Error, Result};
    pub use crate::node::{InputPort, Node, NodeBody, OutputPort};
    pub use crate::pipeline::{NodeId, Pipeline};
    pub use crate::util::body_from_fn;
}

// Re-export main error type
pub use error::{Error, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
