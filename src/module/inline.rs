//! In-process modules
//!
//! Lets an embedding application register modules compiled into the binary
//! next to the ones discovered on disk.

use crate::http::{Request, Response};
use crate::module::traits::{Module, ModuleError, ModuleMetadata};
use crate::router::DispatchContext;

type ExecFn = dyn Fn(&mut Request, &mut DispatchContext) -> Result<Option<Response>, ModuleError>
    + Send
    + Sync;

/// Module whose `exec` is a closure
pub struct InlineModule {
    metadata: ModuleMetadata,
    exec: Box<ExecFn>,
}

impl InlineModule {
    pub fn new<F>(metadata: ModuleMetadata, exec: F) -> Self
    where
        F: Fn(&mut Request, &mut DispatchContext) -> Result<Option<Response>, ModuleError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            metadata,
            exec: Box::new(exec),
        }
    }

    /// Module that declines every request
    pub fn declining(metadata: ModuleMetadata) -> Self {
        Self::new(metadata, |_, _| Ok(None))
    }
}

impl Module for InlineModule {
    fn metadata(&self) -> &ModuleMetadata {
        &self.metadata
    }

    fn exec(
        &self,
        request: &mut Request,
        ctx: &mut DispatchContext,
    ) -> Result<Option<Response>, ModuleError> {
        (self.exec)(request, ctx)
    }
}
