//! # Restore Phase
//!
//! Re-instantiates every captured entity under the new server instance.
//! The pending-save list is snapshotted into a working copy and cleared
//! before iteration: restoring an entity can itself trigger nested capture
//! side-effects through the adapter's teardown hook, so the loop must
//! never run over a live, mutable list.

use log::{info, warn};

use crate::entity::adapter::MigratableEntity;

use super::MigrationCoordinator;

impl MigrationCoordinator {
    pub(super) fn restore_entities(&mut self) {
        // Entities left unclaimed from a prior, incomplete cycle are
        // abandoned: despawn them and start from an empty registry.
        for (owner, handles) in self.repossessions.drain_all() {
            for id in handles {
                warn!(
                    "despawning entity {} abandoned while pending repossession by '{}'",
                    id, owner
                );
                self.driver.despawn(id);
                // Removed directly, not via untrack: an abandoned entity
                // must not contribute a fresh snapshot on its way out.
                self.tracked.remove(&id);
            }
        }

        let pending = std::mem::take(&mut self.pending_saves);
        info!("restoring {} captured entity(ies)", pending.len());

        for snapshot in &pending {
            let (id, entity) = match self.driver.instantiate(
                &snapshot.prototype_name,
                snapshot.position,
                snapshot.orientation,
            ) {
                Ok(pair) => pair,
                Err(err) => {
                    warn!(
                        "dropping snapshot for prototype '{}': {}",
                        snapshot.prototype_name, err
                    );
                    continue;
                }
            };

            self.driver.spawn(id);

            let adapter = MigratableEntity::new(id, entity);
            adapter.restore_snapshot(snapshot);

            if snapshot.is_owned() {
                // Deactivated until the owner reconnects and claims it.
                self.repossessions.register(&snapshot.owner_identity, id);
                adapter.entity().borrow_mut().set_active(false);
            }
            self.tracked.insert(id, adapter);
        }
    }
}
