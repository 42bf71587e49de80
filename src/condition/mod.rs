//! Value-gated condition variable.
//!
//! A [`Gate`] couples an integer with a mutex and a condition variable.
//! Waiters block until the integer equals the value they asked for, and by
//! default keep the mutex across the wakeup so they can inspect or mutate
//! dependent state before deciding which value the gate is left with. The
//! gate can also carry a payload `T` behind the same mutex, so state that
//! must only change together with the gated value (a work queue, say) cannot
//! be touched without holding the gate's lock.
//!
//! Invalidation releases every waiter at once with a "not satisfied" answer
//! and turns all further waits into immediate refusals until [`Gate::restore`]
//! is called. This is how an orderly shutdown stops consumers from trapping
//! themselves on a gate that will never open again.


use std::ops::{Deref, DerefMut};

use parking_lot::{Condvar, Mutex, MutexGuard};

struct State<T> {
    value: i32,
    valid: bool,
    data: T,
}

/// An integer-valued gate paired with a mutex and a condition variable.
///
/// The plain form `Gate<()>` is a pure synchronization primitive; `Gate<T>`
/// additionally guards a payload that is reachable only through a held
/// [`GateGuard`].
pub struct Gate<T = ()> {
    state: Mutex<State<T>>,
    cond: Condvar,
}

impl Gate<()> {
    /// Creates a gate with the given initial value and no payload.
    ///
    /// A waiter asking for `value` will pass through immediately.
    pub fn new(value: i32) -> Self {
        Self::with_data(value, ())
    }
}

impl<T> Gate<T> {
    /// Creates a gate with the given initial value, guarding `data`.
    pub fn with_data(value: i32, data: T) -> Self {
        Self {
            state: Mutex::new(State {
                value,
                valid: true,
                data,
            }),
            cond: Condvar::new(),
        }
    }

    /// Acquires the gate's lock unconditionally, without waiting for any
    /// particular value.
    pub fn lock(&self) -> GateGuard<'_, T> {
        GateGuard {
            gate: self,
            state: Some(self.state.lock()),
        }
    }

    /// Blocks until the gate's value equals `awaited`, then returns with the
    /// lock held.
    ///
    /// While the returned guard is alive the value cannot change, so the
    /// condition that woke the waiter still holds. Call
    /// [`GateGuard::release`] to store a new value and wake the waiters, or
    /// drop the guard to unlock without signalling.
    ///
    /// Returns `None` if the gate is, or becomes, invalidated; the lock is
    /// *not* held in that case. An invalidated gate refuses even a matching
    /// value.
    pub fn lock_when(&self, awaited: i32) -> Option<GateGuard<'_, T>> {
        let mut state = self.state.lock();
        while state.value != awaited && state.valid {
            self.cond.wait(&mut state);
        }
        if state.valid {
            Some(GateGuard {
                gate: self,
                state: Some(state),
            })
        } else {
            None
        }
    }

    /// Blocks until the gate's value equals `awaited`, then immediately
    /// releases it again with that same value, waking the other waiters.
    ///
    /// This is the pass-through form of [`Gate::lock_when`] for callers that
    /// only need to be gated, not to hold the lock. Returns `false` if the
    /// gate was invalidated.
    pub fn wait_for(&self, awaited: i32) -> bool {
        match self.lock_when(awaited) {
            Some(guard) => {
                guard.release(awaited);
                true
            }
            None => false,
        }
    }

    /// Stores a new value and wakes the waiters.
    ///
    /// Blocks only for the brief moment needed to take the lock; if the gate
    /// is currently retained by a waiter, this waits until it is released.
    ///
    /// Every waiter is woken, not just one: waiters may be gating on
    /// different values, and a single wakeup handed to the wrong one would
    /// be swallowed when it goes back to sleep.
    pub fn set(&self, value: i32) {
        self.state.lock().value = value;
        self.cond.notify_all();
    }

    /// Returns the current value. A coarse snapshot: the value may change
    /// the instant the lock is dropped again.
    pub fn get(&self) -> i32 {
        self.state.lock().value
    }

    /// Wakes one waiter so it re-checks the gate's value.
    pub fn signal(&self) {
        self.cond.notify_one();
    }

    /// Wakes all waiters so they re-check the gate's value.
    pub fn broadcast(&self) {
        self.cond.notify_all();
    }

    /// Disables the gate and releases every waiter with a negative answer.
    ///
    /// Idempotent: invalidating an already-invalid gate does nothing.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        if state.valid {
            state.valid = false;
            drop(state);
            self.cond.notify_all();
        }
    }

    /// Re-enables a gate previously disabled with [`Gate::invalidate`].
    /// Does not wake or re-block anyone by itself.
    pub fn restore(&self) {
        self.state.lock().valid = true;
    }
}

/// Proof that the gate's lock is held.
///
/// Dereferences to the gate's payload. Dropping the guard unlocks the gate
/// without changing its value and without signalling; the usual exit path is
/// [`GateGuard::release`].
pub struct GateGuard<'a, T> {
    gate: &'a Gate<T>,
    state: Option<MutexGuard<'a, State<T>>>,
}

impl<'a, T> GateGuard<'a, T> {
    /// The gate's value as it was captured under this lock.
    pub fn value(&self) -> i32 {
        self.inner().value
    }

    /// Stores `value`, unlocks the gate, then wakes the waiters. As with
    /// [`Gate::set`], all of them: only the waiters themselves know which
    /// value they are gating on.
    pub fn release(mut self, value: i32) {
        if let Some(mut state) = self.state.take() {
            state.value = value;
            drop(state);
            self.gate.cond.notify_all();
        }
    }

    fn inner(&self) -> &State<T> {
        self.state.as_deref().expect("gate guard used after release")
    }

    fn inner_mut(&mut self) -> &mut State<T> {
        self.state
            .as_deref_mut()
            .expect("gate guard used after release")
    }
}

impl<T> Deref for GateGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner().data
    }
}

impl<T> DerefMut for GateGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner_mut().data
    }
}
