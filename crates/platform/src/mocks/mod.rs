//! Mock implementations for testing
//!
//! [`MockDevice`] scripts GPIO lookups and allocation failures, [`MockLine`]
//! models a physical pin whose level outlives the handle, and [`MockDelay`]
//! records waits. All three can share one [`Journal`] so tests can assert the
//! order in which a driver touched the hardware.

#![cfg(any(test, feature = "std"))]

use core::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};

use crate::device::{AllocError, Device};
use crate::error::GpioError;
use crate::gpio::GpioFlags;

/// Hardware interaction recorded by the mocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Device-managed memory reservation.
    Reserve {
        /// Requested size in bytes.
        size: usize,
    },
    /// GPIO request, successful or not.
    Lookup {
        /// Connection ID.
        con_id: String,
        /// Index within the connection.
        index: u32,
        /// Requested configuration.
        flags: GpioFlags,
    },
    /// Output value written through a line handle.
    Set {
        /// Connection ID of the line.
        con_id: String,
        /// Value written.
        state: PinState,
    },
    /// Blocking delay.
    Delay {
        /// Duration in nanoseconds.
        ns: u64,
    },
}

/// Shared, ordered event log.
pub type Journal = Rc<RefCell<Vec<Event>>>;

#[derive(Default)]
struct PhysicalPin {
    level: Cell<Option<PinState>>,
    claimed: Cell<bool>,
    fail_writes: Cell<bool>,
}

/// Output line handed out by [`MockDevice`].
///
/// Dropping the handle releases the claim but leaves the pin level as it
/// was, like a real line whose consumer goes away.
pub struct MockLine {
    con_id: String,
    pin: Rc<PhysicalPin>,
    journal: Journal,
}

impl MockLine {
    /// Connection ID this line was requested under.
    pub fn con_id(&self) -> &str {
        &self.con_id
    }

    /// Current logical level.
    pub fn state(&self) -> Option<PinState> {
        self.pin.level.get()
    }

    fn write(&mut self, state: PinState) -> Result<(), GpioError> {
        if self.pin.fail_writes.get() {
            return Err(GpioError::Io);
        }
        self.pin.level.set(Some(state));
        self.journal.borrow_mut().push(Event::Set {
            con_id: self.con_id.clone(),
            state,
        });
        Ok(())
    }
}

impl Drop for MockLine {
    fn drop(&mut self) {
        self.pin.claimed.set(false);
    }
}

impl ErrorType for MockLine {
    type Error = GpioError;
}

impl OutputPin for MockLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(PinState::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(PinState::High)
    }
}

/// Scriptable platform device.
pub struct MockDevice {
    name: String,
    hid: String,
    pins: HashMap<(String, u32), Rc<PhysicalPin>>,
    scripted: HashMap<String, VecDeque<GpioError>>,
    fail_alloc: bool,
    journal: Journal,
}

impl MockDevice {
    /// Device with no GPIO resources.
    pub fn new(name: &str, hid: &str) -> Self {
        Self {
            name: name.to_string(),
            hid: hid.to_string(),
            pins: HashMap::new(),
            scripted: HashMap::new(),
            fail_alloc: false,
            journal: Journal::default(),
        }
    }

    /// Map line `con_id`, index 0.
    pub fn with_gpio(self, con_id: &str) -> Self {
        self.with_gpio_index(con_id, 0)
    }

    /// Map line `con_id`, `index`.
    pub fn with_gpio_index(mut self, con_id: &str, index: u32) -> Self {
        self.pins
            .insert((con_id.to_string(), index), Rc::default());
        self
    }

    /// Return `errors` from the next lookups of `con_id`, one per call,
    /// before falling back to the normal mapping.
    pub fn with_lookup_errors(
        mut self,
        con_id: &str,
        errors: impl IntoIterator<Item = GpioError>,
    ) -> Self {
        self.scripted
            .entry(con_id.to_string())
            .or_default()
            .extend(errors);
        self
    }

    /// Make writes to `con_id` fail with [`GpioError::Io`].
    pub fn with_failing_writes(self, con_id: &str) -> Self {
        for ((id, _), pin) in &self.pins {
            if id == con_id {
                pin.fail_writes.set(true);
            }
        }
        self
    }

    /// Make every device-managed reservation fail.
    pub fn with_failing_allocation(mut self) -> Self {
        self.fail_alloc = true;
        self
    }

    /// Share an existing journal (e.g. one also given to [`MockDelay`]).
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Handle to this device's journal.
    pub fn journal(&self) -> Journal {
        Rc::clone(&self.journal)
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.journal.borrow().clone()
    }

    /// Physical level of `con_id` index 0; `None` if never configured.
    pub fn pin_state(&self, con_id: &str) -> Option<PinState> {
        self.pins
            .get(&(con_id.to_string(), 0))
            .and_then(|pin| pin.level.get())
    }

    /// `true` while a [`MockLine`] for `con_id` index 0 is alive.
    pub fn is_claimed(&self, con_id: &str) -> bool {
        self.pins
            .get(&(con_id.to_string(), 0))
            .is_some_and(|pin| pin.claimed.get())
    }

    /// Number of lookups made for `con_id`.
    pub fn lookup_count(&self, con_id: &str) -> usize {
        self.journal
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Lookup { con_id: id, .. } if id == con_id))
            .count()
    }

    /// `true` if any write drove a line high.
    pub fn was_asserted(&self) -> bool {
        self.journal.borrow().iter().any(|e| {
            matches!(
                e,
                Event::Set {
                    state: PinState::High,
                    ..
                }
            )
        })
    }

    /// `true` if any write drove a line low.
    pub fn was_deasserted(&self) -> bool {
        self.journal.borrow().iter().any(|e| {
            matches!(
                e,
                Event::Set {
                    state: PinState::Low,
                    ..
                }
            )
        })
    }
}

impl Device for MockDevice {
    type Line = MockLine;

    fn name(&self) -> &str {
        &self.name
    }

    fn acpi_hid(&self) -> &str {
        &self.hid
    }

    fn devm_reserve(&mut self, layout: Layout) -> Result<(), AllocError> {
        self.journal
            .borrow_mut()
            .push(Event::Reserve { size: layout.size() });
        if self.fail_alloc {
            return Err(AllocError);
        }
        Ok(())
    }

    fn gpiod_get_index(
        &mut self,
        con_id: &str,
        index: u32,
        flags: GpioFlags,
    ) -> Result<MockLine, GpioError> {
        self.journal.borrow_mut().push(Event::Lookup {
            con_id: con_id.to_string(),
            index,
            flags,
        });
        if let Some(err) = self
            .scripted
            .get_mut(con_id)
            .and_then(VecDeque::pop_front)
        {
            return Err(err);
        }
        let pin = self
            .pins
            .get(&(con_id.to_string(), index))
            .ok_or(GpioError::NotFound)?;
        if pin.claimed.get() {
            return Err(GpioError::Busy);
        }
        pin.claimed.set(true);
        if let Some(initial) = flags.initial_state() {
            pin.level.set(Some(initial));
        }
        Ok(MockLine {
            con_id: con_id.to_string(),
            pin: Rc::clone(pin),
            journal: Rc::clone(&self.journal),
        })
    }
}

/// Delay that returns immediately and records what was asked for.
///
/// Clones share the same counters, so a test can keep one while the driver
/// owns another.
#[derive(Clone, Default)]
pub struct MockDelay {
    total_ns: Rc<Cell<u64>>,
    journal: Option<Journal>,
}

impl MockDelay {
    /// Delay with its own counter and no journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay that also appends [`Event::Delay`] to `journal`.
    pub fn with_journal(journal: Journal) -> Self {
        Self {
            total_ns: Rc::default(),
            journal: Some(journal),
        }
    }

    /// Total requested delay in nanoseconds.
    pub fn total_ns(&self) -> u64 {
        self.total_ns.get()
    }

    /// Total requested delay in whole milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.total_ns.get() / 1_000_000
    }

    fn record(&mut self, ns: u64) {
        self.total_ns.set(self.total_ns.get().saturating_add(ns));
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push(Event::Delay { ns });
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.record(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.record(u64::from(us).saturating_mul(1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.record(u64::from(ms).saturating_mul(1_000_000));
    }
}
