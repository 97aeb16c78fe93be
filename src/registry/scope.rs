//! Public scopes and instance handles
//!
//! A factory produces a [`PublicScope`]: the object a plugin exposes to its
//! callers. The registry wraps it in an [`Instance`], a cheap shared handle
//! that supports identity comparison and downcasting back to the concrete
//! scope type.

use serde_json::Value;
use std::any::{type_name, Any};
use std::fmt;
use std::rc::Rc;

use crate::domain::PluginKey;

/// Downcasting support for public scopes, implemented for every `'static` type
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// The external interface of a plugin instance
///
/// `init` is optional: the default does nothing. It runs once per built
/// instance, on the fresh scope, before the instance is shared with anyone.
/// State that must change after that point (a singleton seen by several
/// callers) needs interior mutability such as `Cell` or `RefCell`.
pub trait PublicScope: AsAny {
    fn init(&mut self, _args: &[Value]) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Shared handle to a built plugin instance
#[derive(Clone)]
pub struct Instance {
    key: PluginKey,
    scope: Rc<dyn PublicScope>,
}

impl Instance {
    pub(crate) fn new(key: PluginKey, scope: Box<dyn PublicScope>) -> Self {
        Self {
            key,
            scope: Rc::from(scope),
        }
    }

    /// Key of the definition that built this instance
    pub fn key(&self) -> &PluginKey {
        &self.key
    }

    pub fn scope(&self) -> &dyn PublicScope {
        self.scope.as_ref()
    }

    /// Returns the typed scope, or `None` if it is not a `T`
    pub fn downcast<T: PublicScope>(&self) -> Option<Rc<T>> {
        AsAny::into_any_rc(Rc::clone(&self.scope)).downcast::<T>().ok()
    }

    /// Borrows the typed scope, or `None` if it is not a `T`
    pub fn downcast_ref<T: PublicScope>(&self) -> Option<&T> {
        self.scope.as_ref().as_any().downcast_ref::<T>()
    }

    pub fn is<T: PublicScope>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    /// Reference equality: true if both handles point at the same instance
    pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
        Rc::ptr_eq(&a.scope, &b.scope)
    }

    /// Number of live handles to this instance, including the registry's cache
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.scope)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("key", &self.key)
            .field("addr", &Rc::as_ptr(&self.scope).cast::<()>())
            .finish()
    }
}

/// Name of a scope type, for mismatch diagnostics
pub(crate) fn scope_type_name<T: PublicScope>() -> &'static str {
    type_name::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter {
        hits: Cell<u32>,
    }

    impl PublicScope for Counter {}

    struct Greeter {
        greeting: String,
    }

    impl PublicScope for Greeter {
        fn init(&mut self, args: &[Value]) -> anyhow::Result<()> {
            if let Some(name) = args.first().and_then(Value::as_str) {
                self.greeting = format!("hello {}", name);
            }
            Ok(())
        }
    }

    fn key(s: &str) -> PluginKey {
        PluginKey::new(s).unwrap()
    }

    #[test]
    fn downcast_to_concrete_type() {
        let instance = Instance::new(key("counter"), Box::new(Counter { hits: Cell::new(0) }));

        let counter = instance.downcast::<Counter>().unwrap();
        counter.hits.set(3);

        assert_eq!(instance.downcast_ref::<Counter>().unwrap().hits.get(), 3);
        assert!(instance.is::<Counter>());
        assert!(instance.downcast::<Greeter>().is_none());
        assert!(instance.downcast_ref::<Greeter>().is_none());
    }

    #[test]
    fn default_init_is_a_no_op() {
        let mut counter = Counter { hits: Cell::new(7) };
        counter.init(&[Value::from(1)]).unwrap();
        assert_eq!(counter.hits.get(), 7);
    }

    #[test]
    fn custom_init_sees_args() {
        let mut greeter = Greeter {
            greeting: String::new(),
        };
        greeter.init(&[Value::from("bob")]).unwrap();
        assert_eq!(greeter.greeting, "hello bob");
    }

    #[test]
    fn identity_follows_the_shared_scope() {
        let a = Instance::new(key("c"), Box::new(Counter { hits: Cell::new(0) }));
        let b = Instance::new(key("c"), Box::new(Counter { hits: Cell::new(0) }));
        let a2 = a.clone();

        assert!(Instance::ptr_eq(&a, &a2));
        assert!(!Instance::ptr_eq(&a, &b));
        assert_eq!(a.handle_count(), 2);
        assert_eq!(a2.key().as_str(), "c");
    }
}
