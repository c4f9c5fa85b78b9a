//! # Migration Coordinator
//!
//! Orchestrates host migration on one peer. An external membership service
//! announces the new owner identity; the coordinator compares it against
//! the local identity and runs either the host-promotion sequence or the
//! client-reconnect sequence. All state is mutated in response to
//! externally delivered callbacks (owner change, role-state notifications,
//! per-tick update) on one cooperative execution context; the "wait for
//! started/stopped" steps are resumed by a later callback through a
//! one-shot wait slot that is cleared when it fires.

mod promotion;
mod restore;

use std::collections::BTreeMap;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use peerhost_shared::connection::{RoleKind, RoleState};
use peerhost_shared::identity::is_unowned;
use peerhost_shared::snapshot::EntitySnapshot;

use crate::driver::SessionDriver;
use crate::entity::adapter::MigratableEntity;
use crate::entity::{EntityId, SharedEntity};
use crate::events::{EventListener, MigrationEvent, MigrationOutcome};
use crate::reconnect::{ReconnectConfig, ReconnectScheduler, RetryDecision};
use crate::registry::RepossessionRegistry;
use crate::timers::{TimerKind, TimerQueue};

/// Phase of the migration state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationPhase {
    /// No migration in progress
    Idle,

    /// Running the host-promotion sequence
    PromotingHost,

    /// Client path: waiting for teardown / the scheduled first attempt
    AwaitingReconnect,

    /// Client path: a connection attempt is in flight or scheduled
    Reconnecting,
}

/// Which role-state notification the current sequence step is waiting on.
/// At most one wait is pending at a time; it is cleared when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleWait {
    /// Host path: local client role stopping before promotion
    ClientStopped,

    /// Host path: a leftover server role stopping
    ServerStopped,

    /// Host path: the new server role coming up
    ServerStarted,

    /// Client path: local client role stopping before the reconnect loop
    ClientStoppedForReconnect,

    /// Client path: terminal result of one connection attempt
    ClientAttempt,
}

/// The migration orchestrator for one peer. Owned by session setup and
/// passed by handle to collaborators; its registries drain with the
/// session.
pub struct MigrationCoordinator {
    driver: Box<dyn SessionDriver>,
    phase: MigrationPhase,
    is_migrating: bool,
    tracked: BTreeMap<EntityId, MigratableEntity>,
    pending_saves: Vec<EntitySnapshot>,
    repossessions: RepossessionRegistry,
    timers: TimerQueue,
    reconnect: ReconnectScheduler,
    role_wait: Option<RoleWait>,
    listeners: Vec<EventListener>,
    now: Duration,
    /// Set once the local client connection starts tearing down; gates the
    /// lazy per-entity capture so routine despawns do not accumulate
    /// snapshots.
    client_tearing_down: bool,
}

impl MigrationCoordinator {
    pub fn new(driver: Box<dyn SessionDriver>) -> Self {
        Self::with_config(driver, ReconnectConfig::default())
    }

    pub fn with_config(driver: Box<dyn SessionDriver>, config: ReconnectConfig) -> Self {
        Self {
            driver,
            phase: MigrationPhase::Idle,
            is_migrating: false,
            tracked: BTreeMap::new(),
            pending_saves: Vec::new(),
            repossessions: RepossessionRegistry::new(),
            timers: TimerQueue::new(),
            reconnect: ReconnectScheduler::new(config),
            role_wait: None,
            listeners: Vec::new(),
            now: Duration::ZERO,
            client_tearing_down: false,
        }
    }

    pub fn phase(&self) -> MigrationPhase {
        self.phase
    }

    pub fn is_migrating(&self) -> bool {
        self.is_migrating
    }

    /// Register a listener for migration lifecycle events.
    pub fn on_event(&mut self, listener: EventListener) {
        self.listeners.push(listener);
    }

    fn emit(&mut self, event: MigrationEvent) {
        for listener in self.listeners.iter_mut() {
            listener(event);
        }
    }

    // ---- entity registration -------------------------------------------

    /// Begin tracking an entity for migration. Entities carrying the
    /// opt-out marker are refused and never tracked.
    pub fn track(&mut self, id: EntityId, entity: SharedEntity) -> bool {
        if entity.borrow().migration_opt_out() {
            debug!("entity {} opted out of migration, not tracking", id);
            return false;
        }
        self.tracked.insert(id, MigratableEntity::new(id, entity));
        true
    }

    /// Stop tracking an entity, capturing one last snapshot on its way out
    /// when a teardown is in progress. The eager capture, if it already
    /// ran, wins: an entity contributes at most one snapshot per cycle,
    /// matched by owner identity + prototype name.
    pub fn untrack(&mut self, id: EntityId) {
        let Some(adapter) = self.tracked.remove(&id) else {
            return;
        };
        if !(self.is_migrating || self.client_tearing_down) {
            return;
        }
        let Some(snapshot) = adapter.save_snapshot() else {
            return;
        };
        let duplicate = self
            .pending_saves
            .iter()
            .any(|s| s.matches_entity(&snapshot.owner_identity, &snapshot.prototype_name));
        if duplicate {
            debug!(
                "entity {} already captured for '{}', skipping teardown save",
                id, snapshot.owner_identity
            );
            return;
        }
        self.pending_saves.push(snapshot);
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    // ---- capture -------------------------------------------------------

    /// Eager capture of every tracked entity. A no-op when the pending
    /// list is already populated, which is what makes the capture phase
    /// idempotent across the teardown notification and the promotion
    /// sequence.
    pub fn capture_all(&mut self) {
        if !self.pending_saves.is_empty() {
            debug!(
                "pending-save list already holds {} snapshot(s), reusing",
                self.pending_saves.len()
            );
            return;
        }
        for adapter in self.tracked.values() {
            // Entities with no owner identity are unowned and not restored.
            if let Some(snapshot) = adapter.save_snapshot() {
                self.pending_saves.push(snapshot);
            }
        }
        info!("captured {} entity snapshot(s)", self.pending_saves.len());
    }

    pub fn pending_save_count(&self) -> usize {
        self.pending_saves.len()
    }

    // ---- external inputs -----------------------------------------------

    /// Membership notification: the session owner changed. Dispatches to
    /// the host-promotion or client-reconnect sequence; a second
    /// notification arriving mid-cycle is dropped.
    pub fn handle_owner_changed(&mut self, new_owner: &str) {
        if self.is_migrating {
            info!(
                "ignoring owner change to '{}': a migration is already in progress",
                new_owner
            );
            return;
        }
        if is_unowned(new_owner) {
            info!("ignoring owner change with empty identity");
            return;
        }
        if self.driver.local_identity() == new_owner {
            self.begin_host_promotion();
        } else {
            self.begin_client_reconnect(new_owner);
        }
    }

    /// Client-role state notification. `Stopping` arms teardown and runs
    /// the eager capture; only the terminal states resolve waits.
    pub fn handle_client_state(&mut self, state: RoleState) {
        debug!("{:?} role state: {:?}", RoleKind::Client, state);
        match state {
            RoleState::Stopping => {
                self.client_tearing_down = true;
                self.capture_all();
                return;
            }
            RoleState::Starting => return,
            RoleState::Started => {
                // A teardown that came back up without a migration was an
                // abort; its eager capture is stale and must not seed a
                // later cycle.
                if self.client_tearing_down && !self.is_migrating {
                    self.pending_saves.clear();
                }
                self.client_tearing_down = false;
            }
            RoleState::Stopped => {}
        }

        match (self.role_wait, state) {
            (Some(RoleWait::ClientStopped), RoleState::Stopped) => {
                self.role_wait = None;
                self.promotion_client_stopped();
            }
            (Some(RoleWait::ClientStoppedForReconnect), RoleState::Stopped) => {
                self.role_wait = None;
                self.schedule_next_attempt(self.reconnect.initial_delay());
            }
            (Some(RoleWait::ClientAttempt), RoleState::Started) => {
                self.role_wait = None;
                info!(
                    "reconnected on attempt {}/{}",
                    self.reconnect.attempts(),
                    self.reconnect.max_attempts()
                );
                self.finish_cycle(MigrationOutcome::Succeeded);
            }
            (Some(RoleWait::ClientAttempt), RoleState::Stopped) => {
                self.role_wait = None;
                self.reconnect_attempt_failed();
            }
            _ => {}
        }
    }

    /// Server-role state notification; only terminal states resolve waits.
    pub fn handle_server_state(&mut self, state: RoleState) {
        debug!("{:?} role state: {:?}", RoleKind::Server, state);
        if !state.is_terminal() {
            return;
        }
        match (self.role_wait, state) {
            (Some(RoleWait::ServerStopped), RoleState::Stopped) => {
                self.role_wait = None;
                self.promotion_server_stopped();
            }
            (Some(RoleWait::ServerStarted), RoleState::Started) => {
                self.role_wait = None;
                self.promotion_server_started();
            }
            _ => {}
        }
    }

    /// Per-tick update on the caller's monotonic clock: refreshes every
    /// adapter's cached snapshot and fires due timers.
    pub fn tick(&mut self, now: Duration) {
        self.now = now;
        for adapter in self.tracked.values_mut() {
            adapter.tick();
        }
        while let Some((_, kind)) = self.timers.pop_due(now) {
            match kind {
                TimerKind::ReconnectDelay => self.start_reconnect_attempt(),
            }
        }
    }

    // ---- client-reconnect sequence -------------------------------------

    fn begin_client_reconnect(&mut self, new_owner: &str) {
        info!("migration started: reconnecting to new host '{}'", new_owner);
        self.phase = MigrationPhase::AwaitingReconnect;
        self.is_migrating = true;
        self.reconnect.reset();
        // Unlike the host path the client has no capture work, so the
        // started notification goes out immediately.
        self.emit(MigrationEvent::Started);

        if self.driver.is_client_started() {
            self.driver.stop_client();
            self.role_wait = Some(RoleWait::ClientStoppedForReconnect);
        } else {
            self.schedule_next_attempt(self.reconnect.initial_delay());
        }
    }

    fn schedule_next_attempt(&mut self, delay: Duration) {
        debug!("next reconnect attempt in {:?}", delay);
        self.timers.schedule(self.now + delay, TimerKind::ReconnectDelay);
    }

    fn start_reconnect_attempt(&mut self) {
        if !self.reconnect.begin_attempt() {
            self.finish_cycle(MigrationOutcome::ReconnectFailed);
            return;
        }
        self.phase = MigrationPhase::Reconnecting;
        info!(
            "reconnect attempt {}/{}",
            self.reconnect.attempts(),
            self.reconnect.max_attempts()
        );
        self.driver.start_client();
        self.role_wait = Some(RoleWait::ClientAttempt);
    }

    fn reconnect_attempt_failed(&mut self) {
        match self.reconnect.on_attempt_failed() {
            RetryDecision::Retry(delay) => self.schedule_next_attempt(delay),
            RetryDecision::GiveUp => {
                info!(
                    "reconnect failed after {} attempt(s)",
                    self.reconnect.attempts()
                );
                self.finish_cycle(MigrationOutcome::ReconnectFailed);
            }
        }
    }

    // ---- cycle completion ----------------------------------------------

    /// Close out the current cycle on either path.
    fn finish_cycle(&mut self, outcome: MigrationOutcome) {
        self.phase = MigrationPhase::Idle;
        self.is_migrating = false;
        self.client_tearing_down = false;
        self.pending_saves.clear();
        self.timers.cancel_all();
        self.role_wait = None;
        info!("migration completed: {:?}", outcome);
        self.emit(MigrationEvent::Completed(outcome));
    }

    // ---- repossession --------------------------------------------------

    /// Entities awaiting repossession by `owner`, in restore order.
    pub fn pending_repossessions(&self, owner: &str) -> &[EntityId] {
        self.repossessions.pending(owner)
    }

    /// Claim everything pending for `owner` and reactivate it. All or
    /// nothing: claiming under any other identity returns no handles.
    pub fn claim_repossessed(&mut self, owner: &str) -> Vec<EntityId> {
        let handles = self.repossessions.claim(owner);
        for id in &handles {
            if let Some(adapter) = self.tracked.get(id) {
                adapter.entity().borrow_mut().set_active(true);
            }
        }
        if !handles.is_empty() {
            info!("'{}' repossessed {} entity(ies)", owner, handles.len());
        }
        handles
    }

    /// Wipe all migration state for an intentional session exit. Distinct
    /// from migration completion: registries are cleared without despawns
    /// and any pending wait or timer is dropped.
    pub fn clear_state(&mut self) {
        info!("clearing all migration state");
        self.pending_saves.clear();
        self.repossessions.clear();
        self.timers.cancel_all();
        self.role_wait = None;
        self.reconnect.reset();
        self.phase = MigrationPhase::Idle;
        self.is_migrating = false;
        self.client_tearing_down = false;
    }
}
