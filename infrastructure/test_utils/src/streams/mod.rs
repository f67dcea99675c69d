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

use std::time::Duration;

use tokio::{sync::broadcast, time};

/// Collect $take items from a `tokio::sync::broadcast::Receiver`, panicking if any item takes
/// longer than $timeout to arrive or the channel closes early.
///
/// Requires the `tokio` runtime and should be used in an async context.
#[macro_export]
macro_rules! collect_try_recv {
    ($rx:expr, take = $take:expr, timeout = $timeout:expr $(,)?) => {{
        let mut items = Vec::with_capacity($take);
        for i in 0..$take {
            let item = tokio::time::timeout($timeout, $rx.recv())
                .await
                .unwrap_or_else(|_| panic!("Timeout before receiving item {} of {}", i + 1, $take))
                .expect("Channel closed before all items were received");
            items.push(item);
        }
        items
    }};
}

/// Receive items from a broadcast channel until `predicate` returns `Some`, panicking if
/// `timeout` elapses or the channel closes first. Items the predicate rejects are discarded.
pub async fn assert_in_broadcast<T, F, R>(rx: &mut broadcast::Receiver<T>, mut predicate: F, timeout: Duration) -> R
where
    T: Clone,
    F: FnMut(T) -> Option<R>,
{
    let deadline = time::Instant::now() + timeout;
    loop {
        let remaining = deadline
            .checked_duration_since(time::Instant::now())
            .expect("Timeout before a matching item was broadcast");
        let item = time::timeout(remaining, rx.recv())
            .await
            .expect("Timeout before a matching item was broadcast")
            .expect("Channel closed before a matching item was broadcast");
        if let Some(ret) = predicate(item) {
            return ret;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn collects_requested_number_of_items() {
        let (tx, mut rx) = broadcast::channel(10);
        for i in 0..5 {
            tx.send(i).unwrap();
        }
        let items = collect_try_recv!(rx, take = 3, timeout = Duration::from_secs(1));
        assert_eq!(items, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn finds_matching_broadcast_item() {
        let (tx, mut rx) = broadcast::channel(10);
        for i in 0..5 {
            tx.send(i).unwrap();
        }
        let found = assert_in_broadcast(&mut rx, |n| if n == 3 { Some(n) } else { None }, Duration::from_secs(1)).await;
        assert_eq!(found, 3);
    }
}
