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

use std::fmt;

use crate::{radio::LinkSettings, types::SlotId};

/// Occupancy of a data-connection slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Inactive,
    Activating,
    Active,
}

impl SlotStatus {
    is_fn!(is_inactive, SlotStatus::Inactive);

    is_fn!(is_active, SlotStatus::Active);

    /// The slot has been claimed for a setup in flight or an established call.
    pub fn is_in_use(&self) -> bool {
        !self.is_inactive()
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One physical data-connection resource. Created at startup and reused across
/// connect/disconnect cycles; never destroyed while the tracker lives.
#[derive(Debug, Clone)]
pub struct DataConnection {
    id: SlotId,
    status: SlotStatus,
    link: Option<LinkSettings>,
}

impl DataConnection {
    fn inactive(id: SlotId) -> Self {
        Self {
            id,
            status: SlotStatus::Inactive,
            link: None,
        }
    }

    #[inline]
    pub fn id(&self) -> SlotId {
        self.id
    }

    #[inline]
    pub fn status(&self) -> SlotStatus {
        self.status
    }

    #[inline]
    pub fn link(&self) -> Option<&LinkSettings> {
        self.link.as_ref()
    }
}

impl fmt::Display for DataConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot {} ({})", self.id, self.status)
    }
}

/// Fixed-size set of data-connection slots. At most one slot is active at a time; the pool
/// size generalizes the model but this tracker drives a single call.
#[derive(Debug, Clone)]
pub struct DataConnectionPool {
    slots: Vec<DataConnection>,
}

impl DataConnectionPool {
    /// Create all slots up front. The pool never grows or shrinks afterwards.
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity.max(1)).map(|i| DataConnection::inactive(SlotId(i))).collect();
        Self { slots }
    }

    /// First slot not in use, scanning in id order.
    pub fn find_free(&self) -> Option<SlotId> {
        self.slots.iter().find(|slot| slot.status.is_inactive()).map(|slot| slot.id)
    }

    pub fn get(&self, id: SlotId) -> Option<&DataConnection> {
        self.slots.get(id.0)
    }

    /// The slot currently claimed for a setup in flight or an established call, if any.
    pub fn in_use(&self) -> Option<SlotId> {
        self.slots.iter().find(|slot| slot.status.is_in_use()).map(|slot| slot.id)
    }

    /// The active slot, if any.
    pub fn active(&self) -> Option<&DataConnection> {
        self.slots.iter().find(|slot| slot.status.is_active())
    }

    pub fn count_active(&self) -> usize {
        self.slots.iter().filter(|slot| slot.status.is_active()).count()
    }

    pub(in crate::tracker) fn set_activating(&mut self, id: SlotId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.status = SlotStatus::Activating;
            slot.link = None;
        }
    }

    pub(in crate::tracker) fn set_active(&mut self, id: SlotId, link: LinkSettings) {
        debug_assert!(self.count_active() == 0, "a slot is already active");
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.status = SlotStatus::Active;
            slot.link = Some(link);
        }
    }

    /// Return the slot to the pool, clearing any link settings.
    pub(in crate::tracker) fn clear(&mut self, id: SlotId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.status = SlotStatus::Inactive;
            slot.link = None;
        }
    }
}
