// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session: the graph store, the datatype registry and the configuration
//! every typed value of one scene shares.

use crate::config::NodexConfig;
use crate::datatype::{DataType, Shape, TypeRegistry};
use crate::error::{NodexError, Result};
use crate::math::Math;
use crate::nodex::Nodex;
use crate::reference::{normalize, Input, Normalized, Reference};
use nodex_graph::GraphStore;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// How a constructor treats the requested datatype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preference {
    Infer,
    Hint(DataType),
    Strict(DataType),
}

struct SessionInner {
    store: Mutex<Box<dyn GraphStore + Send>>,
    registry: TypeRegistry,
    config: NodexConfig,
}

/// Shared handle to a graph store.
///
/// Cloning is cheap; all clones talk to the same store. The store lock is
/// held only for the duration of a single [`Session::with_store`] call.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create a session with the default configuration
    pub fn new(store: impl GraphStore + Send + 'static) -> Self {
        Self::with_config(store, NodexConfig::default())
    }

    /// Create a session with a custom configuration
    pub fn with_config(store: impl GraphStore + Send + 'static, config: NodexConfig) -> Self {
        let registry = TypeRegistry::standard().with_tracing(config.trace_resolution);
        Self::with_registry(store, registry, config)
    }

    /// Create a session with a custom datatype registry
    pub fn with_registry(
        store: impl GraphStore + Send + 'static,
        registry: TypeRegistry,
        config: NodexConfig,
    ) -> Self {
        tracing::debug!(types = registry.types().len(), "created nodex session");
        Self {
            inner: Arc::new(SessionInner {
                store: Mutex::new(Box::new(store)),
                registry,
                config,
            }),
        }
    }

    /// Session configuration
    pub fn config(&self) -> &NodexConfig {
        &self.inner.config
    }

    /// Finalized datatype registry
    pub fn registry(&self) -> &TypeRegistry {
        &self.inner.registry
    }

    /// Run `f` with exclusive access to the graph store
    pub fn with_store<R>(&self, f: impl FnOnce(&mut dyn GraphStore) -> R) -> R {
        let mut store = self.inner.store.lock();
        f(&mut **store)
    }

    /// Math recipe builder
    pub fn math(&self) -> Math<'_> {
        Math::new(self)
    }

    /// Wrap input as a typed value, inferring its datatype
    pub fn nodex(&self, input: impl Into<Input>) -> Result<Nodex> {
        self.construct(input.into(), Preference::Infer)
    }

    /// Wrap input, trying `hint` before falling back to inference
    pub fn nodex_with(&self, input: impl Into<Input>, hint: DataType) -> Result<Nodex> {
        self.construct(input.into(), Preference::Hint(hint))
    }

    /// Wrap input as exactly `datatype`
    pub fn nodex_as(&self, input: impl Into<Input>, datatype: DataType) -> Result<Nodex> {
        self.construct(input.into(), Preference::Strict(datatype))
    }

    /// Wrap the attribute `attr` of the node called `node`
    pub fn attr(&self, node: &str, attr: &str) -> Result<Nodex> {
        self.nodex(format!("{node}.{attr}"))
    }

    fn construct(&self, input: Input, preference: Preference) -> Result<Nodex> {
        let reference = match normalize(self, input)? {
            Normalized::Existing(nodex) => return self.retype(nodex, preference),
            Normalized::Data(reference) => reference,
        };
        if matches!(&reference, Reference::Tuple(items) if items.is_empty()) {
            return Err(NodexError::UndefinedType("empty list".to_string()));
        }

        let shape = Shape::of(self, &reference)?;
        let datatype = match preference {
            Preference::Strict(datatype) if datatype.accepts(&shape) => datatype,
            Preference::Strict(datatype) => {
                return Err(NodexError::InvalidData {
                    datatype,
                    data: format!("{shape:?}"),
                })
            }
            Preference::Hint(hint) => self
                .registry()
                .resolve(&shape, Some(hint))
                .ok_or_else(|| NodexError::UndefinedType(format!("{shape:?}")))?,
            Preference::Infer => self
                .registry()
                .resolve(&shape, None)
                .ok_or_else(|| NodexError::UndefinedType(format!("{shape:?}")))?,
        };
        let reference = datatype.convert(self, reference)?;
        Ok(Nodex::from_parts(self.clone(), reference, datatype))
    }

    /// Re-wrap an existing typed value under the requested datatype
    fn retype(&self, nodex: Nodex, preference: Preference) -> Result<Nodex> {
        let requested = match preference {
            Preference::Infer => return Ok(nodex),
            Preference::Hint(datatype) | Preference::Strict(datatype) => datatype,
        };
        if requested == nodex.datatype() {
            return Ok(nodex);
        }
        let shape = Shape::of(self, nodex.reference())?;
        if !requested.accepts(&shape) {
            return match preference {
                Preference::Strict(datatype) => Err(NodexError::InvalidData {
                    datatype,
                    data: nodex.to_string(),
                }),
                _ => Ok(nodex),
            };
        }
        let reference = requested.convert(self, nodex.reference().clone())?;
        Ok(Nodex::from_parts(self.clone(), reference, requested))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::datatype::DataType;
    use crate::error::NodexError;
    use crate::testing::session_with_sphere;

    #[test]
    fn test_infer_scalars() {
        let session = session_with_sphere();
        assert_eq!(session.nodex(true).unwrap().datatype(), DataType::Boolean);
        assert_eq!(session.nodex(2).unwrap().datatype(), DataType::Integer);
        assert_eq!(session.nodex(2.5).unwrap().datatype(), DataType::Float);
    }

    #[test]
    fn test_infer_lists() {
        let session = session_with_sphere();
        let v = session.nodex(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(v.datatype(), DataType::Vector);
        assert_eq!(v.dimensions().unwrap(), 3);

        let m = session.nodex(vec![0.0; 16]).unwrap();
        assert_eq!(m.datatype(), DataType::Matrix);
        assert_eq!(m.dimensions().unwrap(), 16);

        for len in [1, 2, 4, 5, 15] {
            let a = session.nodex(vec![1.0; len]).unwrap();
            assert_eq!(a.datatype(), DataType::Array, "len {len}");
            assert_eq!(a.dimensions().unwrap(), len);
        }
    }

    #[test]
    fn test_infer_attributes() {
        let session = session_with_sphere();
        assert_eq!(session.attr("pSphere1", "t").unwrap().datatype(), DataType::Vector);
        assert_eq!(session.attr("pSphere1", "tx").unwrap().datatype(), DataType::Float);
        assert_eq!(session.attr("pSphere1", "v").unwrap().datatype(), DataType::Boolean);
        assert_eq!(session.attr("pSphere1", "m").unwrap().datatype(), DataType::Matrix);
    }

    #[test]
    fn test_empty_list_is_undefined() {
        let session = session_with_sphere();
        let empty: Vec<f64> = Vec::new();
        for result in [
            session.nodex(empty.clone()),
            session.nodex_with(empty.clone(), DataType::Array),
            session.nodex_as(empty, DataType::Array),
        ] {
            assert!(matches!(result, Err(NodexError::UndefinedType(_))));
        }
    }

    #[test]
    fn test_hint_falls_back_to_inference() {
        let session = session_with_sphere();
        let hinted = session.nodex_with(vec![1.0, 2.0, 3.0], DataType::Array).unwrap();
        assert_eq!(hinted.datatype(), DataType::Array);

        let fallback = session.nodex_with(vec![1.0, 2.0], DataType::Vector).unwrap();
        assert_eq!(fallback.datatype(), DataType::Array);
    }

    #[test]
    fn test_strict_rejects_incompatible_data() {
        let session = session_with_sphere();
        let err = session.nodex_as(vec![1.0, 2.0], DataType::Vector).unwrap_err();
        assert!(matches!(err, NodexError::InvalidData { datatype: DataType::Vector, .. }));

        let f = session.nodex_as(2, DataType::Float).unwrap();
        assert_eq!(f.datatype(), DataType::Float);
        assert_eq!(f.as_f64().unwrap(), 2.0);
    }

    #[test]
    fn test_existing_values_are_retyped_on_request() {
        let session = session_with_sphere();
        let v = session.nodex(vec![1.0, 2.0, 3.0]).unwrap();
        let same = session.nodex(&v).unwrap();
        assert_eq!(same.datatype(), DataType::Vector);

        let array = session.nodex_as(&v, DataType::Array).unwrap();
        assert_eq!(array.datatype(), DataType::Array);
        assert_eq!(array.dimensions().unwrap(), 3);

        assert!(session.nodex_as(&v, DataType::Matrix).is_err());
    }

    #[test]
    fn test_unresolved_strings() {
        let session = session_with_sphere();
        assert!(matches!(
            session.nodex("pSphere1"),
            Err(NodexError::UnresolvedReference(_))
        ));
        assert!(matches!(
            session.attr("pSphere1", "bogus"),
            Err(NodexError::UnresolvedReference(_))
        ));
    }
}
