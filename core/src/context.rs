//! Ambient data-context registry
//!
//! Lazy relations are loaded by a [`DataContext`] registered for the owning
//! entity type on the current thread. Registration is scoped: the returned
//! [`ContextGuard`] unregisters the context when dropped, and nested
//! registrations for the same type shadow outer ones until then.

use crate::error::Result;
use crate::record::Record;
use crate::schema::{Column, Entity};
use crate::store::Store;
use core::any::TypeId;
use core::marker::PhantomData;
use hashbrown::HashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Loads the child rows of a to-many relation.
pub trait DataContext {
    /// Fetch the rows related to `owner` through `relation`.
    fn load_relation(&self, owner: &Record<'_>, relation: &Column) -> Result<Store>;
}

thread_local! {
    static CONTEXTS: RefCell<HashMap<TypeId, Vec<Rc<dyn DataContext>>>> =
        RefCell::new(HashMap::new());
}

/// Keeps a context registered for as long as it is alive.
#[must_use = "the context is unregistered as soon as the guard is dropped"]
pub struct ContextGuard {
    owner: TypeId,
    context: Rc<dyn DataContext>,
    // Registrations are per thread; the guard must be dropped where it was created.
    _not_send: PhantomData<Rc<()>>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CONTEXTS.with(|contexts| {
            let mut contexts = contexts.borrow_mut();
            if let Some(stack) = contexts.get_mut(&self.owner) {
                // Guards may drop out of order; remove this guard's own entry.
                let own = Rc::as_ptr(&self.context).cast::<()>();
                if let Some(at) = stack
                    .iter()
                    .rposition(|c| Rc::as_ptr(c).cast::<()>() == own)
                {
                    stack.remove(at);
                }
                if stack.is_empty() {
                    contexts.remove(&self.owner);
                }
            }
        });
    }
}

/// Register `context` for relations owned by `T` on the current thread.
pub fn register_context<T: Entity>(context: impl DataContext + 'static) -> ContextGuard {
    register_context_for(TypeId::of::<T>(), Rc::new(context))
}

/// Register an already shared context under an explicit owner type id.
pub fn register_context_for(owner: TypeId, context: Rc<dyn DataContext>) -> ContextGuard {
    CONTEXTS.with(|contexts| {
        contexts
            .borrow_mut()
            .entry(owner)
            .or_default()
            .push(Rc::clone(&context));
    });
    ContextGuard {
        owner,
        context,
        _not_send: PhantomData,
    }
}

/// The innermost context registered for `owner` on the current thread.
pub fn lookup_context(owner: TypeId) -> Option<Rc<dyn DataContext>> {
    CONTEXTS.with(|contexts| {
        contexts
            .borrow()
            .get(&owner)
            .and_then(|stack| stack.last().cloned())
    })
}
