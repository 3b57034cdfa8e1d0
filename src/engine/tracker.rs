//! Instance tracker: periodic width checks for every registered instance.
//!
//! The registry holds weak handles only, so it never keeps an instance alive. Dead
//! handles are pruned during sweeps; live instances deregister themselves on
//! `destroy`.
//!
//! Instances are `Rc<RefCell<_>>` and live on the UI thread, so the process-wide
//! tracker is a thread-local. [`start_tracking`] arms the sweep once; later calls are
//! no-ops.

use super::instance::InstanceId;
use crate::model::TrackerError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Time between two sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_millis(500);

/// Anything the tracker can sweep.
pub trait Tracked {
    /// Registry key.
    fn instance_id(&self) -> InstanceId;

    /// Store the current container width; `true` if it changed.
    fn check_width(&mut self) -> bool;
}

type Handle = Weak<RefCell<dyn Tracked>>;

/// Registry of tracked instances plus the sweep schedule.
#[derive(Default)]
pub struct Tracker {
    registry: BTreeMap<InstanceId, Handle>,
    next_sweep: Option<Instant>,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("registered", &self.registry.keys().collect::<Vec<_>>())
            .field("next_sweep", &self.next_sweep)
            .finish()
    }
}

impl Tracker {
    /// Create a disabled, empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the sweep. Returns `false` if it was already armed.
    pub fn enable(&mut self, now: Instant) -> bool {
        if self.next_sweep.is_some() {
            return false;
        }
        self.next_sweep = Some(now + SWEEP_INTERVAL);
        true
    }

    /// Whether the sweep is armed.
    pub fn is_enabled(&self) -> bool {
        self.next_sweep.is_some()
    }

    /// Add `handle` under `id`.
    ///
    /// # Errors
    ///
    /// [`TrackerError::AlreadyRegistered`] if `id` is present.
    pub fn register(&mut self, id: InstanceId, handle: Handle) -> Result<(), TrackerError> {
        if self.registry.contains_key(&id) {
            return Err(TrackerError::AlreadyRegistered(id));
        }
        self.registry.insert(id, handle);
        Ok(())
    }

    /// Remove `id`. Returns whether it was registered.
    pub fn deregister(&mut self, id: InstanceId) -> bool {
        self.registry.remove(&id).is_some()
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: InstanceId) -> bool {
        self.registry.contains_key(&id)
    }

    /// Number of registered handles, dead ones included until the next sweep.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// When the next sweep is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_sweep
    }

    /// If a sweep is due at `now`, prune dead handles, schedule the next sweep and
    /// return the live instances to check.
    pub fn take_due(&mut self, now: Instant) -> Vec<Rc<RefCell<dyn Tracked>>> {
        match self.next_sweep {
            Some(due) if now >= due => {}
            _ => return Vec::new(),
        }
        self.next_sweep = Some(now + SWEEP_INTERVAL);

        let before = self.registry.len();
        let mut live = Vec::with_capacity(before);
        self.registry.retain(|_, handle| match handle.upgrade() {
            Some(instance) => {
                live.push(instance);
                true
            }
            None => false,
        });

        if live.len() != before {
            debug!(pruned = before - live.len(), "Dropped dead tracker handles");
        }
        live
    }

    /// Disarm the sweep and forget every handle.
    pub fn shutdown(&mut self) {
        self.registry.clear();
        self.next_sweep = None;
    }
}

thread_local! {
    static TRACKER: RefCell<Tracker> = RefCell::new(Tracker::new());
}

/// Arm the thread's tracker. Returns `false` if it was already running.
pub fn start_tracking(now: Instant) -> bool {
    let started = TRACKER.with(|tracker| tracker.borrow_mut().enable(now));
    if started {
        info!(interval_ms = SWEEP_INTERVAL.as_millis() as u64, "Width tracking started");
    }
    started
}

/// Whether the thread's tracker is running.
pub fn is_tracking() -> bool {
    TRACKER.with(|tracker| tracker.borrow().is_enabled())
}

/// Register an instance with the thread's tracker.
///
/// # Errors
///
/// [`TrackerError::AlreadyRegistered`] if the instance is already tracked.
pub fn register<T: Tracked + 'static>(instance: &Rc<RefCell<T>>) -> Result<(), TrackerError> {
    let id = instance.borrow().instance_id();
    let strong: Rc<RefCell<dyn Tracked>> = instance.clone();
    let handle = Rc::downgrade(&strong);
    TRACKER.with(|tracker| tracker.borrow_mut().register(id, handle))?;
    debug!(instance = %id, "Registered for width tracking");
    Ok(())
}

/// Remove an instance from the thread's tracker. Safe during thread teardown.
pub fn deregister(id: InstanceId) -> bool {
    TRACKER
        .try_with(|tracker| {
            tracker
                .try_borrow_mut()
                .map(|mut tracker| tracker.deregister(id))
                .unwrap_or(false)
        })
        .unwrap_or(false)
}

/// Whether `id` is registered with the thread's tracker.
pub fn is_registered(id: InstanceId) -> bool {
    TRACKER.with(|tracker| tracker.borrow().contains(id))
}

/// Run a sweep if one is due. Returns how many instances reported a width change.
///
/// Instances currently borrowed elsewhere are skipped until the next sweep.
pub fn poll(now: Instant) -> usize {
    let due = TRACKER.with(|tracker| tracker.borrow_mut().take_due(now));
    let mut changed = 0;
    for instance in due {
        let Ok(mut instance) = instance.try_borrow_mut() else {
            trace!("Skipping busy instance during sweep");
            continue;
        };
        if instance.check_width() {
            changed += 1;
        }
    }
    changed
}

/// When the thread's next sweep is due.
pub fn next_deadline() -> Option<Instant> {
    TRACKER.with(|tracker| tracker.borrow().next_deadline())
}

/// Stop the thread's tracker and forget every handle.
pub fn shutdown() {
    TRACKER.with(|tracker| tracker.borrow_mut().shutdown());
}
