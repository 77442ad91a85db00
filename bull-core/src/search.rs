//! Address arbitration
//!
//! Units that share one address separate themselves by electing numbered
//! time slots:
//!
//! 1. The master broadcasts a write of the search parameter carrying the
//!    number of slots. Every unit starts a round, keeping the slot it
//!    announced last round if it still fits, otherwise drawing one.
//! 2. The master broadcasts a read of the search parameter for every slot
//!    in turn. The unit whose slot is polled answers (even though the poll
//!    was a broadcast) with a freshly drawn slot for the next round.
//! 3. Every unit overhears those answers and remembers the announced slots
//!    so its own draws avoid them.
//!
//! Once no two units answer the same poll, the master writes each unit a
//! new address, qualified by the slot that unit announced.
//!
//! Slot 0 is never drawn. A unit that cannot find a free slot announces 0,
//! which the master detects by polling slot 0.

use heapless::Vec;

use crate::config::{MAX_SLOTS, SLOT_DRAW_ATTEMPTS};
use crate::entropy::EntropyPool;

/// A unit's slot in an arbitration round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    /// No slot (wire value 0)
    #[default]
    Unassigned,
    /// Slot number, always in 1..=255
    Assigned(u8),
}

impl Slot {
    /// Decode a wire value
    pub fn from_wire(value: u8) -> Self {
        match value {
            0 => Slot::Unassigned,
            n => Slot::Assigned(n),
        }
    }

    /// Encode to a wire value
    pub fn to_wire(self) -> u8 {
        match self {
            Slot::Unassigned => 0,
            Slot::Assigned(n) => n,
        }
    }

    /// Whether this is a usable slot of a round with `slot_count` slots
    pub fn fits(self, slot_count: u8) -> bool {
        matches!(self, Slot::Assigned(n) if n <= slot_count)
    }
}

/// Outcome of electing a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotDraw {
    /// A slot not known to be taken
    Drawn(u8),
    /// Every attempt hit a taken slot (or the round has no slots)
    Exhausted,
}

impl SlotDraw {
    /// Slot to announce for this outcome
    pub fn slot(self) -> Slot {
        match self {
            SlotDraw::Drawn(n) => Slot::Assigned(n),
            SlotDraw::Exhausted => Slot::Unassigned,
        }
    }
}

/// Arbitration state of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SearchState {
    /// No round started since boot
    Idle,
    /// A round is in progress (until the next one starts)
    RoundActive,
}

/// Per-unit arbitration state
#[derive(Debug, Clone)]
pub struct Arbitration {
    state: SearchState,
    /// Slots in the current round
    slot_count: u8,
    /// Slots announced by other units this round
    used: Vec<u8, MAX_SLOTS>,
    /// Slot this unit answers to in the current round
    selected: Slot,
    /// Slot this unit announced for the next round
    next: Slot,
}

impl Default for Arbitration {
    fn default() -> Self {
        Self::new()
    }
}

impl Arbitration {
    pub fn new() -> Self {
        Self {
            state: SearchState::Idle,
            slot_count: 0,
            used: Vec::new(),
            selected: Slot::Unassigned,
            next: Slot::Unassigned,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn slot_count(&self) -> u8 {
        self.slot_count
    }

    /// Slot polled for this unit in the current round
    pub fn selected(&self) -> Slot {
        self.selected
    }

    /// Slot most recently announced
    pub fn next(&self) -> Slot {
        self.next
    }

    /// Slots known to be taken this round
    pub fn used_slots(&self) -> &[u8] {
        &self.used
    }

    /// Start a round with `slot_count` slots
    ///
    /// Forgets every slot heard last round. The announced slot carries
    /// over if it fits the new round; otherwise a fresh one is drawn.
    pub fn start_round(&mut self, slot_count: u8, pool: &mut EntropyPool) {
        self.state = SearchState::RoundActive;
        self.slot_count = slot_count;
        self.used.clear();

        if !self.next.fits(slot_count) {
            self.next = self.draw(pool).slot();
        }
        self.selected = self.next;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Search round: {} slots, selected {:?}",
            slot_count,
            self.selected
        );
    }

    /// Handle a poll of `probed` slot
    ///
    /// If it is ours, draws and returns the slot to announce for the next
    /// round. Units that never joined a round do not answer.
    pub fn poll(&mut self, probed: u8, pool: &mut EntropyPool) -> Option<Slot> {
        if self.state != SearchState::RoundActive || Slot::from_wire(probed) != self.selected {
            return None;
        }

        self.next = self.draw(pool).slot();

        #[cfg(feature = "defmt")]
        defmt::debug!("Slot {} polled, announcing {:?}", probed, self.next);

        Some(self.next)
    }

    /// Remember a slot another unit announced
    ///
    /// Slot 0 carries no information. Announcements beyond the tracker's
    /// capacity are dropped; later draws may then collide.
    pub fn observe(&mut self, announced: u8) {
        if announced == 0 || self.used.contains(&announced) {
            return;
        }
        if self.used.push(announced).is_err() {
            #[cfg(feature = "defmt")]
            defmt::trace!("Collision tracker full, dropping slot {}", announced);
        }
    }

    /// Whether `slot` is the one this unit announced
    ///
    /// Slot 0 never matches; units that hold no slot cannot be told apart.
    pub fn is_us(&self, slot: u8) -> bool {
        matches!(self.next, Slot::Assigned(n) if n == slot)
    }

    /// Whether `slot` was announced by someone else this round
    pub fn is_taken(&self, slot: u8) -> bool {
        self.used.contains(&slot)
    }

    /// Draw a slot in `1..=slot_count` avoiding known taken slots
    ///
    /// Gives up after `SLOT_DRAW_ATTEMPTS` draws.
    pub fn draw(&self, pool: &mut EntropyPool) -> SlotDraw {
        if self.slot_count == 0 {
            return SlotDraw::Exhausted;
        }

        for _ in 0..SLOT_DRAW_ATTEMPTS {
            let candidate = 1 + pool.bounded_integer(self.slot_count - 1);
            if !self.is_taken(candidate) {
                return SlotDraw::Drawn(candidate);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::warn!(
            "No free slot among {} after {} draws",
            self.slot_count,
            SLOT_DRAW_ATTEMPTS
        );
        SlotDraw::Exhausted
    }
}
