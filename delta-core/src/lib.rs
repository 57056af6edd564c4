//! Delta Core
//!
//! This crate provides the core engines for the Delta incremental computation
//! library. It implements:
//!
//! - A pull-based, demand-driven evaluator with version-based staleness
//! - A push-based delta-propagation evaluator built from composable stages
//! - Adapters lifting each evaluator into the other's interface
//!
//! Both evaluators recompute only what their inputs require. They differ in
//! what they know: the pull engine knows what is *demanded* but not what
//! *changed*; the push engine knows what changed but assumes everything is
//! demanded.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Static node graph, topological ordering and cycle detection
//! - `pull`: The `Makelike` engine and the `Deps` read/write interface
//! - `push`: The `Diffs` stage contract, combinators, stages and push `Graph`
//! - `adapters`: `PullFromPush` and `PushFromPull`
//! - `error`: Error kinds shared by all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use delta_core::graph::NodeGraph;
//! use delta_core::pull::Makelike;
//!
//! let graph = NodeGraph::builder()
//!     .derive("foo.o", |deps| compile(deps[0]), ["foo.c"])
//!     .derive("bar.o", |deps| compile(deps[0]), ["bar.c"])
//!     .derive("lib.a", |deps| link(deps), ["foo.o", "bar.o"])
//!     .build()?;
//!
//! let mut make = Makelike::new(graph);
//! make.write("foo.c", "A".into())?;
//! make.write("bar.c", "B".into())?;
//!
//! // Compiles both objects and links once.
//! let lib = make.read(&"lib.a")?;
//!
//! // Recompiles only bar.o, then relinks.
//! make.write("bar.c", "B2".into())?;
//! let lib = make.read(&"lib.a")?;
//! ```

pub mod adapters;
pub mod error;
pub mod graph;
pub mod pull;
pub mod push;

pub use error::{Error, Result};
