//! # Host-Promotion Sequence
//!
//! The sequence run by the peer selected to become the new authoritative
//! server: capture, teardown of the old roles, network-id cleanup, server
//! restart, entity restore, self-connect, observer rebuild. Each "wait"
//! step is resumed by a role-state callback; within one cycle capture
//! always precedes teardown, teardown precedes restart, and restart
//! precedes restore.

use log::{info, warn};

use peerhost_shared::identity::NETWORK_ID_UNSET;

use crate::events::{MigrationEvent, MigrationOutcome};

use super::{MigrationCoordinator, MigrationPhase, RoleWait};

impl MigrationCoordinator {
    /// Step 1-3: enter the promoting phase, capture (or reuse the eager
    /// capture), and stop the local client role.
    pub(super) fn begin_host_promotion(&mut self) {
        info!("migration started: local peer promoted to host");
        self.phase = MigrationPhase::PromotingHost;
        self.is_migrating = true;
        self.capture_all();
        self.emit(MigrationEvent::Started);

        if self.driver.is_client_started() {
            self.driver.stop_client();
            self.role_wait = Some(RoleWait::ClientStopped);
        } else {
            self.promotion_client_stopped();
        }
    }

    /// Step 4: stop a server role that is unexpectedly still running.
    pub(super) fn promotion_client_stopped(&mut self) {
        if self.driver.is_server_started() {
            warn!("server role unexpectedly running before promotion, stopping it");
            self.driver.stop_server();
            self.role_wait = Some(RoleWait::ServerStopped);
        } else {
            self.promotion_server_stopped();
        }
    }

    /// Steps 5-6: clear leftover network ids, then start the new server.
    pub(super) fn promotion_server_stopped(&mut self) {
        self.reset_persistent_network_ids();
        self.driver.start_server();
        self.role_wait = Some(RoleWait::ServerStarted);
    }

    /// Steps 7-10: restore entities, self-connect, rebuild observers, and
    /// close out the cycle.
    pub(super) fn promotion_server_started(&mut self) {
        self.restore_entities();
        // The new host is also a player; no wait here, the remaining steps
        // proceed while the self-connect completes.
        self.driver.start_client();
        self.driver.rebuild_observers();
        self.finish_cycle(MigrationOutcome::Succeeded);
    }

    /// Reset persistent entities still carrying a transient network id
    /// from the previous session so the new server instance can
    /// re-register them. A single failing entity does not abort the batch.
    fn reset_persistent_network_ids(&mut self) {
        let mut reset = 0usize;
        for adapter in self.tracked.values() {
            let mut entity = adapter.entity().borrow_mut();
            if !entity.is_persistent() {
                continue;
            }
            if entity.network_id() == NETWORK_ID_UNSET {
                continue;
            }
            match entity.reset_network_id() {
                Ok(()) => reset += 1,
                Err(err) => {
                    warn!(
                        "failed to reset network id on entity {}: {}",
                        adapter.id(),
                        err
                    );
                }
            }
        }
        if reset > 0 {
            info!("reset network ids on {} persistent entity(ies)", reset);
        }
    }
}
