//! Per-dispatch state
//!
//! A [`DispatchContext`] carries everything that must not be shared between
//! concurrent requests: the module stack and the filter state. It also
//! pins the module set snapshot, so a reload never changes the modules
//! seen midway through a (possibly nested) dispatch.

use std::any::Any;
use std::ops::{Deref, DerefMut};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::http::{Request, Response};
use crate::instrumentation::StatSink;
use crate::module::{Module, ModuleError, ModuleSet};
use crate::router::filters::{FilterLog, FilterManager};
use crate::router::stack::ModuleStack;

/// Deepest module nesting allowed before a dispatch is refused
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Request-local dispatch state
pub struct DispatchContext {
    modules: Arc<ModuleSet>,
    sink: Arc<dyn StatSink>,
    stack: ModuleStack,
    filters: Box<dyn FilterManager>,
    max_depth: usize,
}

impl DispatchContext {
    pub fn new(modules: Arc<ModuleSet>, sink: Arc<dyn StatSink>) -> Self {
        Self {
            modules,
            sink,
            stack: ModuleStack::new(),
            filters: Box::new(FilterLog::new()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Replace the filter state collaborator
    pub fn with_filters(mut self, filters: Box<dyn FilterManager>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Route a request and always produce a response
    ///
    /// Called by the router for top-level requests and by module handlers
    /// for nested ones; nested calls share this context's stack and filters.
    /// A context may be reused for several top-level requests: filter state
    /// is cleared at the start of each one.
    pub fn dispatch(&mut self, request: &mut Request) -> Response {
        let outcome = self.route(request);
        outcome.into_response(self.filters.as_ref(), self.sink.as_ref())
    }

    /// Module set this context routes over
    pub fn modules(&self) -> &Arc<ModuleSet> {
        &self.modules
    }

    pub fn sink(&self) -> &Arc<dyn StatSink> {
        &self.sink
    }

    /// Module currently executing, if any
    pub fn current_module(&self) -> Option<&Arc<dyn Module>> {
        self.stack.current()
    }

    pub fn stack_level(&self) -> usize {
        self.stack.depth()
    }

    /// Namespaces of the executing modules, e.g. `/shop/cart`
    pub fn stack_path(&self) -> String {
        self.stack.path_string()
    }

    pub fn module_stack(&self) -> &ModuleStack {
        &self.stack
    }

    pub fn filters(&self) -> &dyn FilterManager {
        self.filters.as_ref()
    }

    pub fn filters_mut(&mut self) -> &mut dyn FilterManager {
        self.filters.as_mut()
    }

    /// Run one module with the stack frame held for exactly the call
    ///
    /// The frame is released even when `exec` fails or panics; a panic is
    /// reported as [`ModuleError::HandlerPanicked`].
    pub(crate) fn invoke(
        &mut self,
        module: &Arc<dyn Module>,
        request: &mut Request,
    ) -> Result<Option<Response>, ModuleError> {
        if self.stack.depth() >= self.max_depth {
            return Err(ModuleError::NestingTooDeep(self.stack.depth()));
        }

        let mut frame = ModuleFrame::enter(self, Arc::clone(module));
        let result = panic::catch_unwind(AssertUnwindSafe(|| module.exec(request, &mut frame)));
        drop(frame);

        result.unwrap_or_else(|payload| Err(ModuleError::HandlerPanicked(panic_message(&*payload))))
    }
}

/// Stack frame guard: pushes on entry, pops on drop
struct ModuleFrame<'a> {
    ctx: &'a mut DispatchContext,
}

impl<'a> ModuleFrame<'a> {
    fn enter(ctx: &'a mut DispatchContext, module: Arc<dyn Module>) -> Self {
        ctx.stack.push(module);
        Self { ctx }
    }
}

impl Deref for ModuleFrame<'_> {
    type Target = DispatchContext;

    fn deref(&self) -> &DispatchContext {
        self.ctx
    }
}

impl DerefMut for ModuleFrame<'_> {
    fn deref_mut(&mut self) -> &mut DispatchContext {
        self.ctx
    }
}

impl Drop for ModuleFrame<'_> {
    fn drop(&mut self) {
        self.ctx.stack.pop();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
