//! Per-thread evaluation context.
use crate::{cell::CellPtr, frame::Frame};
use std::{
    cell::RefCell,
    fmt,
    rc::Rc,
    thread::{self, ThreadId},
};

thread_local! {
    // One context per thread, created on first use. Cells capture the context
    // of their creating thread and compare it against this one on every
    // operation, so threads partition the universe of cells.
    static CONTEXT: Rc<Context> = Rc::new(Context::new());
}

/// Per-thread engine state: the stack of in-flight evaluations.
pub(crate) struct Context {
    stack: RefCell<Vec<Frame>>,
    thread: ThreadId,
}

impl Context {
    fn new() -> Context {
        Context {
            stack: RefCell::new(Vec::new()),
            thread: thread::current().id(),
        }
    }

    /// The context of the calling thread.
    pub(crate) fn current() -> Rc<Context> {
        CONTEXT.with(|cx| cx.clone())
    }

    /// Whether `ctx` is the calling thread's context.
    pub(crate) fn is_current(ctx: &Rc<Context>) -> bool {
        CONTEXT.with(|cx| Rc::ptr_eq(cx, ctx))
    }

    /// Whether an evaluation is in progress on this thread.
    pub(crate) fn evaluating(&self) -> bool {
        !self.stack.borrow().is_empty()
    }

    /// Records `cell` as a callee of the innermost in-flight evaluation, if
    /// any. Outside of an evaluation this does nothing.
    pub(crate) fn record(&self, cell: &CellPtr) {
        if let Some(top) = self.stack.borrow_mut().last_mut() {
            top.record(cell);
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Context")
            .field("thread", &self.thread)
            .field("depth", &self.stack.borrow().len())
            .finish()
    }
}

/// Pops the frame pushed for one evaluation, even if the expression panics.
pub(crate) struct FrameGuard {
    ctx: Rc<Context>,
    armed: bool,
}

impl FrameGuard {
    pub(crate) fn push(ctx: &Rc<Context>) -> FrameGuard {
        ctx.stack.borrow_mut().push(Frame::new());
        FrameGuard {
            ctx: ctx.clone(),
            armed: true,
        }
    }

    /// Ends the evaluation normally, returning the recorded callees.
    pub(crate) fn finish(mut self) -> Vec<CellPtr> {
        self.armed = false;
        self.ctx
            .stack
            .borrow_mut()
            .pop()
            .expect("unbalanced evaluation stack")
            .into_callees()
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if self.armed {
            self.ctx.stack.borrow_mut().pop();
        }
    }
}
