//! Directory fingerprinting over a three-node graph.
//!
//! A scan node walks a directory tree and emits file paths, a digest node
//! fingerprints file contents with a bounded pool of sub-tasks, and a sink
//! node prints the results. The stages share one tagged payload enum.
//!
//! ```text
//! cargo run --example file_hashes -- --dir . --workers 10
//! ```

use std::hash::Hasher;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use flowgraph::prelude::*;

/// Payload carried by every edge of the graph.
#[derive(Debug, Clone)]
enum Item {
    Path(PathBuf),
    Digest { path: PathBuf, hash: u64 },
}

fn parse_args() -> (PathBuf, usize) {
    let mut dir = PathBuf::from(".");
    let mut workers: usize = 10;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dir" | "-d" => {
                if let Some(value) = args.next() {
                    dir = PathBuf::from(value);
                }
            }
            "--workers" | "-w" => {
                if let Some(value) = args.next() {
                    workers = value.parse().unwrap_or(10);
                }
            }
            _ => {}
        }
    }
    (dir, workers.max(1))
}

/// Iterative directory walk; unreadable entries are skipped, not fatal.
fn regular_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            match entry.file_type() {
                Ok(kind) if kind.is_dir() => stack.push(path),
                Ok(kind) if kind.is_file() => files.push(path),
                _ => {}
            }
        }
    }
    files
}

fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    hasher.write(bytes);
    hasher.finish()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let (dir, workers) = parse_args();
    let mut pipeline = Pipeline::new();

    // Scan node: walk the tree and emit one path per write.
    let scan = pipeline.add_node(Node::new(
        0,
        1,
        body_from_fn(move |ctx, _inputs, outputs: Vec<OutputPort<Item>>| async move {
            for path in regular_files(&dir) {
                tokio::select! {
                    _ = ctx.cancelled() => return,
                    res = outputs[0].send(Item::Path(path)) => {
                        if res.is_err() {
                            return;
                        }
                    }
                }
            }
        }),
    ));

    // Digest node: fingerprint files with at most `workers` concurrent
    // sub-tasks, joined before the body returns.
    let digest = pipeline.add_node(Node::new(
        1,
        1,
        body_from_fn(move |ctx, mut inputs: Vec<InputPort<Item>>, outputs| async move {
            let semaphore = Arc::new(Semaphore::new(workers));
            let mut tasks = JoinSet::new();
            let out = outputs[0].clone();
            let input = &mut inputs[0];

            loop {
                let item = tokio::select! {
                    _ = ctx.cancelled() => break,
                    item = input.recv() => item,
                };
                let Some(Item::Path(path)) = item else { break };
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let out = out.clone();
                let ctx = ctx.clone();
                tasks.spawn(async move {
                    let _permit = permit;
                    // A file that vanished or cannot be read is skipped.
                    let Ok(bytes) = tokio::fs::read(&path).await else {
                        return;
                    };
                    let hash = fingerprint(&bytes);
                    tokio::select! {
                        _ = ctx.cancelled() => {}
                        _ = out.send(Item::Digest { path, hash }) => {}
                    }
                });
            }
            while tasks.join_next().await.is_some() {}
        }),
    ));

    // Sink node: print each digest.
    let sink = pipeline.add_node(Node::new(
        1,
        0,
        body_from_fn(|ctx, mut inputs: Vec<InputPort<Item>>, _outputs| async move {
            let input = &mut inputs[0];
            loop {
                let item = tokio::select! {
                    _ = ctx.cancelled() => return,
                    item = input.recv() => item,
                };
                match item {
                    Some(Item::Digest { path, hash }) => {
                        println!("{:016x}  {}", hash, path.display());
                    }
                    Some(_) => {}
                    None => return,
                }
            }
        }),
    ));

    pipeline.connect(scan, 0, digest, 0)?;
    pipeline.connect(digest, 0, sink, 0)?;

    pipeline.run()?;
    pipeline.wait().await;
    Ok(())
}
