// Copyright 2026, The Moblink Project
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use futures::{
    channel::oneshot,
    future::{FusedFuture, Shared},
    FutureExt,
};

/// Trigger half of a shutdown pair.
///
/// Any number of [`ShutdownSignal`]s can be created with `to_signal`; all of them resolve once
/// `trigger` is called. Dropping the `Shutdown` also resolves every signal, so it must be held
/// for as long as the tasks it governs should keep running.
#[derive(Clone, Debug)]
pub struct Shutdown {
    trigger: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    signal: ShutdownSignal,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            trigger: Arc::new(Mutex::new(Some(tx))),
            signal: ShutdownSignal { inner: rx.shared() },
        }
    }

    /// Resolve all signals. Subsequent calls have no effect.
    pub fn trigger(&mut self) {
        let mut guard = self.trigger.lock().unwrap();
        if let Some(tx) = guard.take() {
            let _result = tx.send(());
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.trigger.lock().unwrap().is_none()
    }

    pub fn to_signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver end of a shutdown pair. Resolves when the matching [`Shutdown`] is triggered or
/// dropped; the consumer should then stop its work.
#[derive(Debug, Clone)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct ShutdownSignal {
    inner: Shared<oneshot::Receiver<()>>,
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        self.inner.is_terminated()
    }
}

impl Future for ShutdownSignal {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.inner.is_terminated() {
            return Poll::Ready(());
        }
        match Pin::new(&mut self.inner).poll(cx) {
            // Resolve on an explicit trigger (Ok) as well as on a dropped Shutdown (Err)
            Poll::Ready(_) => Poll::Ready(()),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl FusedFuture for ShutdownSignal {
    fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }
}
