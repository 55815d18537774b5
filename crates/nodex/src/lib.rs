// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed values over a host node graph.
//!
//! A [`Nodex`] wraps either an attribute of the host graph or a constant
//! (number, list of numbers, tuple of values) and carries a [`DataType`].
//! Arithmetic on typed values builds computation nodes in the graph and
//! returns a typed value for the result:
//!
//! ```ignore
//! let session = Session::new(Graph::new("scene"));
//! let tx = session.attr("pSphere1", "tx")?;
//! let doubled = (&tx * 2.0)?;
//! doubled.connect(&session.attr("pSphere1", "ty")?)?;
//! ```
//!
//! ## Architecture
//!
//! - [`reference`] normalizes raw inputs into references
//! - [`datatype`] holds the type registry and resolver
//! - [`connect`] reconciles dimensions when wiring values together
//! - [`math`] is the node-builder library behind the operators in [`ops`]
//! - [`Session`] binds a [`GraphStore`](nodex_graph::GraphStore), the
//!   registry and [`NodexConfig`]

pub mod config;
pub mod connect;
pub mod datatype;
pub mod error;
pub mod introspect;
pub mod math;
pub mod nodex;
pub mod ops;
pub mod reference;
pub mod rewire;
pub mod session;

pub use config::{ConfigError, NodexConfig};
pub use connect::ConnectOptions;
pub use datatype::{DataType, Shape, TypeRegistry, TypeRegistryBuilder};
pub use error::{NodexError, Result};
pub use math::{
    Comparison, ComposeInputs, ConditionInputs, Decomposition, DoubleLinear, Math,
    MultiplyDivide, PlusMinusAverage, RecipeOptions,
};
pub use nodex::Nodex;
pub use reference::{Input, Reference, Scalar};
pub use session::Session;

pub use nodex_graph;

#[cfg(test)]
pub(crate) mod testing {
    use crate::session::Session;
    use nodex_graph::{Graph, GraphStore};

    /// Session over a fresh graph holding one `transform` named `pSphere1`
    pub fn session_with_sphere() -> Session {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
        let mut graph = Graph::new("test");
        graph
            .create_node("transform", "pSphere1")
            .expect("transform node type is built in");
        Session::new(graph)
    }

    pub fn nodes_of_type(session: &Session, type_name: &str) -> usize {
        session.with_store(|store| {
            store
                .nodes()
                .into_iter()
                .filter(|node| store.node_type(*node).is_ok_and(|t| t == type_name))
                .count()
        })
    }
}
