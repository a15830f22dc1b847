use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use super::component::Component;

// ---------------------------------------------------------------------------
// ComponentRegistry
// ---------------------------------------------------------------------------

/// Registry for lifecycle-managed components.
///
/// Provides two lookup mechanisms:
/// - **By name** (`get_by_name`): uses the component's `name()` string
/// - **By type** (`get::<T>`): uses `TypeId`
///
/// Several components may share a concrete type under different names. Type
/// lookup then resolves to the first one registered; reach the others by name.
///
/// Registration order is kept for deterministic wire/start/shutdown sequencing.
pub struct ComponentRegistry {
    by_name: DashMap<&'static str, Arc<dyn Component>>,
    by_type: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    order: RwLock<Vec<&'static str>>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_name: DashMap::new(),
            by_type: DashMap::new(),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Register a component. Returns `false` and leaves the registry unchanged
    /// if a component with the same name exists.
    pub fn register<T: Component>(&self, component: T) -> bool {
        let name = component.name();
        let mut order = self.order.write();
        if self.by_name.contains_key(name) {
            return false;
        }
        let arc = Arc::new(component);
        self.by_name.insert(name, arc.clone());
        self.by_type.entry(TypeId::of::<T>()).or_insert(arc);
        order.push(name);
        true
    }

    /// Retrieve the first registered component of concrete type `T`.
    pub fn get<T: Component>(&self) -> Option<Arc<T>> {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value().clone().downcast::<T>().ok())
    }

    /// Retrieve a component by its name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Component>> {
        self.by_name.get(name).map(|entry| entry.value().clone())
    }

    /// Components in registration order.
    pub fn in_order(&self) -> Vec<Arc<dyn Component>> {
        let order = self.order.read().clone();
        order
            .iter()
            .filter_map(|name| self.get_by_name(name))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.read().is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
