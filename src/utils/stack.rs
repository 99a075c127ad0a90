//! Native stack growth for nested script calls.
//!
//! Every script call polls the futures of its whole body inside the poll of
//! its caller, so the native stack grows with the call depth. Calls poll
//! through [`GrowStack`], which moves onto a fresh stack segment when less
//! than [`RED_ZONE`] remains.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

/// Stack space that must remain before a call is polled in place.
const RED_ZONE: usize = 256 * 1024;

/// Size of each new stack segment.
const STACK_PER_SEGMENT: usize = 2 * 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_SEGMENT, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Polls the wrapped future with enough native stack.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct GrowStack<F>(pub F);

impl<F: Future + Unpin> Future for GrowStack<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<F::Output> {
        let inner = &mut self.0;
        ensure_sufficient_stack(|| Pin::new(inner).poll(cx))
    }
}

#[cfg(test)]
mod tests {
    use futures::{FutureExt, executor::block_on, future::LocalBoxFuture};

    use super::*;

    fn depth(n: u64) -> LocalBoxFuture<'static, u64> {
        GrowStack(
            async move {
                if n == 0 { 0 } else { depth(n - 1).await + 1 }
            }
            .boxed_local(),
        )
        .boxed_local()
    }

    #[test]
    fn test_deep_nesting() {
        assert_eq!(block_on(depth(50_000)), 50_000);
    }
}
