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
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    sync::{broadcast, mpsc},
    time,
};

use crate::radio::{RadioCommand, RadioEvent, RadioEventTx, RadioHandle};

/// Create a mock radio actor. Commands sent through the returned [`RadioHandle`] are captured
/// in the shared state; tests publish [`RadioEvent`]s through the same state to drive the
/// tracker.
pub fn create_radio_mock() -> (RadioHandle, RadioMockState) {
    let (command_tx, command_rx) = mpsc::channel(10);
    let (event_tx, _) = broadcast::channel(32);
    let handle = RadioHandle::new(command_tx, event_tx.clone());
    let state = RadioMockState::new(event_tx);
    let mock = RadioMock {
        command_rx,
        state: state.clone(),
    };
    tokio::spawn(mock.run());
    (handle, state)
}

#[derive(Clone)]
pub struct RadioMockState {
    commands: Arc<Mutex<Vec<RadioCommand>>>,
    event_tx: RadioEventTx,
}

impl RadioMockState {
    fn new(event_tx: RadioEventTx) -> Self {
        Self {
            commands: Arc::new(Mutex::new(Vec::new())),
            event_tx,
        }
    }

    pub fn publish_event(&self, event: RadioEvent) {
        self.event_tx.send(event).expect("The tracker is not subscribed to radio events");
    }

    pub fn commands(&self) -> Vec<RadioCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn command_count(&self) -> usize {
        self.commands.lock().unwrap().len()
    }

    /// Wait until at least `count` commands have been captured, panicking on timeout.
    pub async fn wait_for_commands(&self, count: usize, timeout: Duration) -> Vec<RadioCommand> {
        let deadline = time::Instant::now() + timeout;
        loop {
            {
                let commands = self.commands.lock().unwrap();
                if commands.len() >= count {
                    return commands.clone();
                }
            }
            if time::Instant::now() >= deadline {
                panic!(
                    "Timeout waiting for {} radio command(s), got {:?}",
                    count,
                    self.commands()
                );
            }
            time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn push(&self, command: RadioCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

struct RadioMock {
    command_rx: mpsc::Receiver<RadioCommand>,
    state: RadioMockState,
}

impl RadioMock {
    async fn run(mut self) {
        while let Some(command) = self.command_rx.recv().await {
            self.state.push(command);
        }
    }
}
