//! Gate for streaming calls

use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use gate_core::MetadataValidator;
use pin_project_lite::pin_project;
use tonic::{Request, Response, Status};

use super::{CallShape, admit};

pin_project! {
    /// Inbound stream handed to the next handler after the gate accepted it.
    ///
    /// Pure delegation: every item, size hint and end-of-stream comes from
    /// the wrapped stream. Inherent methods of the wrapped stream (such as
    /// `tonic::Streaming::message` and `trailers`) are reachable through
    /// `Deref`/`DerefMut`, so handlers written against the bare stream keep
    /// working unchanged.
    #[derive(Debug)]
    pub struct ForwardedStream<S> {
        #[pin]
        inner: S,
    }
}

impl<S> ForwardedStream<S> {
    /// Wrap `inner`
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped stream
    #[must_use]
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Mutably borrow the wrapped stream (e.g. to read `Streaming` trailers)
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwrap the original stream
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> Deref for ForwardedStream<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S> DerefMut for ForwardedStream<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: Stream> Stream for ForwardedStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Validates a streaming call's metadata once, at stream open.
///
/// Messages are never inspected and the stream is never re-validated.
///
/// Use it for client-streaming and bidirectional methods, where the request
/// body is a message stream. A server-streaming method receives a single
/// request message, so it goes through [`UnaryGate`](super::UnaryGate) or
/// the interceptor; its response stream is returned untouched.
#[derive(Debug, Clone)]
pub struct StreamGate {
    validator: Arc<MetadataValidator>,
}

impl StreamGate {
    /// Create a gate sharing `validator`
    #[must_use]
    pub fn new(validator: Arc<MetadataValidator>) -> Self {
        Self { validator }
    }

    /// Validate the stream's metadata, then run `next` with the stream
    /// wrapped in a [`ForwardedStream`].
    ///
    /// On rejection the stream ends before any message is read and `next`
    /// is never invoked. Otherwise the handler's result is returned as-is.
    pub async fn call<S, Resp, F, Fut>(
        &self,
        request: Request<S>,
        next: F,
    ) -> Result<Response<Resp>, Status>
    where
        F: FnOnce(Request<ForwardedStream<S>>) -> Fut,
        Fut: Future<Output = Result<Response<Resp>, Status>>,
    {
        admit(
            &self.validator,
            request.metadata(),
            request.extensions(),
            CallShape::Stream,
        )?;
        next(request.map(ForwardedStream::new)).await
    }
}
