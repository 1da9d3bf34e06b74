//! Per-thread scoped-override stacks.
//!
//! A [`ScopeStack`] holds the "current value" of something (the output
//! target, the failure handler) together with every value it shadows. The
//! only way to change the current value is [`ScopeStack::push`], which hands
//! back a [`ScopeGuard`]; dropping the guard pops the value again. Pushes and
//! pops are therefore LIFO and balanced on every exit path, including `?`
//! returns and unwinding.
//!
//! ```text
//! depth 1   initial()          <- pushed lazily on first access, never popped
//! depth 2   Redirect::to_path  <- guard A
//! depth 3   Redirect::to_shared<- guard B (top)
//! ```

use std::cell::RefCell;
use std::marker::PhantomData;
use std::thread::{self, LocalKey};

use tracing::{error, trace};

/// A value type that can live in a [`ScopeStack`].
///
/// Implementors provide the default that sits at the bottom of the stack
/// and the thread-local slot that stores the stack.
///
/// ```
/// use std::cell::RefCell;
/// use std::thread::LocalKey;
/// use coretools_core::{ScopeStack, Scoped};
///
/// #[derive(Clone)]
/// struct Indent(usize);
///
/// impl Scoped for Indent {
///     const NAME: &'static str = "indent";
///
///     fn initial() -> Self {
///         Indent(0)
///     }
///
///     fn slot() -> &'static LocalKey<RefCell<Vec<Self>>> {
///         thread_local! {
///             static STACK: RefCell<Vec<Indent>> = const { RefCell::new(Vec::new()) };
///         }
///         &STACK
///     }
/// }
///
/// {
///     let _deeper = ScopeStack::push(Indent(4));
///     assert_eq!(ScopeStack::<Indent>::top().0, 4);
/// }
/// assert_eq!(ScopeStack::<Indent>::top().0, 0);
/// ```
pub trait Scoped: Sized + 'static {
    /// Label used in log events.
    const NAME: &'static str;

    /// The bottom entry, pushed on first access and never popped.
    fn initial() -> Self;

    /// The thread-local cell holding this type's stack.
    fn slot() -> &'static LocalKey<RefCell<Vec<Self>>>;
}

/// Access to the per-thread stack of `V`.
pub struct ScopeStack<V>(PhantomData<V>);

impl<V: Scoped> ScopeStack<V> {
    fn with_initialized<R>(f: impl FnOnce(&RefCell<Vec<V>>) -> R) -> R {
        V::slot().with(|cell| {
            if cell.borrow().is_empty() {
                // Build the default before borrowing mutably; `initial` may
                // touch other stacks.
                let initial = V::initial();
                let mut stack = cell.borrow_mut();
                if stack.is_empty() {
                    stack.push(initial);
                }
            }
            f(cell)
        })
    }

    /// Run `f` against the current top of the stack.
    ///
    /// The stack stays borrowed while `f` runs, so `f` must not push or pop
    /// scopes of the same type. Prefer [`ScopeStack::top`] for anything that
    /// calls back into user code.
    pub fn with_top<R>(f: impl FnOnce(&V) -> R) -> R {
        Self::with_initialized(|cell| {
            let stack = cell.borrow();
            let top = stack
                .last()
                .unwrap_or_else(|| unreachable!("{} stack is initialized", V::NAME));
            f(top)
        })
    }

    /// Number of entries, including the initial default.
    #[must_use]
    pub fn depth() -> usize {
        Self::with_initialized(|cell| cell.borrow().len())
    }

    /// Number of entries for which `pred` holds.
    pub fn count_where(pred: impl Fn(&V) -> bool) -> usize {
        Self::with_initialized(|cell| cell.borrow().iter().filter(|v| pred(v)).count())
    }

    /// Make `value` the current top until the returned guard is dropped.
    pub fn push(value: V) -> ScopeGuard<V> {
        let depth = Self::with_initialized(|cell| {
            let mut stack = cell.borrow_mut();
            stack.push(value);
            stack.len()
        });
        trace!(scope = V::NAME, depth, "scope pushed");
        ScopeGuard {
            depth,
            _not_send: PhantomData,
        }
    }
}

impl<V: Scoped + Clone> ScopeStack<V> {
    /// A clone of the current top; the stack is not borrowed afterwards.
    #[must_use]
    pub fn top() -> V {
        Self::with_top(V::clone)
    }
}

/// Pops its scope when dropped.
///
/// Guards cannot be cloned and cannot leave the thread whose stack they
/// belong to:
///
/// ```compile_fail
/// use coretools_core::{ScopeGuard, SharedHandle};
///
/// fn assert_send<T: Send>() {}
/// assert_send::<ScopeGuard<SharedHandle>>();
/// ```
#[must_use = "dropping the guard immediately ends the scope"]
pub struct ScopeGuard<V: Scoped> {
    depth: usize,
    _not_send: PhantomData<*const V>,
}

impl<V: Scoped> ScopeGuard<V> {
    /// Stack depth right after this guard's push.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl<V: Scoped> std::fmt::Debug for ScopeGuard<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("scope", &V::NAME)
            .field("depth", &self.depth)
            .finish()
    }
}

impl<V: Scoped> Drop for ScopeGuard<V> {
    fn drop(&mut self) {
        // The slot is gone once the thread is tearing down its locals.
        let Ok((popped, len)) = V::slot().try_with(|cell| {
            let mut stack = cell.borrow_mut();
            let len = stack.len();
            let popped = if len > 1 { stack.pop() } else { None };
            (popped, len)
        }) else {
            return;
        };

        // Released outside the borrow: dropping the value may log or flush.
        drop(popped);

        if len == self.depth {
            trace!(scope = V::NAME, depth = self.depth, "scope popped");
            return;
        }
        error!(
            scope = V::NAME,
            expected = self.depth,
            actual = len,
            "scope guards dropped out of order"
        );
        debug_assert!(
            thread::panicking(),
            "{} scope dropped at depth {len}, pushed at {}",
            V::NAME,
            self.depth
        );
    }
}
