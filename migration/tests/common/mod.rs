//! Test doubles for the migration core: a scripted `SessionDriver` whose
//! recorded state the tests inspect through a shared handle, and a
//! `TestEntity` with a declared replicated component.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use peerhost_migration::driver::SessionDriver;
use peerhost_migration::entity::{EntityId, ReplicatedComponent, ReplicatedEntity, SharedEntity};
use peerhost_migration::events::MigrationEvent;
use peerhost_migration::MigrationCoordinator;
use peerhost_shared::identity::{NetworkId, NETWORK_ID_UNSET};
use peerhost_shared::snapshot::{ComponentKey, FieldValue};
use peerhost_shared::types::{HostResult, Quat, Vector3};

/// One replicated component with a fixed field list.
pub struct TestComponent {
    type_name: &'static str,
    pub fields: Vec<(&'static str, FieldValue)>,
}

impl TestComponent {
    pub fn score(points: i64) -> Self {
        Self {
            type_name: "Score",
            fields: vec![("points", FieldValue::Int(points))],
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

impl ReplicatedComponent for TestComponent {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn capture(&self, out: &mut dyn FnMut(&'static str, FieldValue)) {
        for (name, value) in &self.fields {
            out(name, value.clone());
        }
    }

    fn restore(&mut self, field: &str, value: &FieldValue) -> bool {
        for (name, slot) in self.fields.iter_mut() {
            if *name == field {
                *slot = value.clone();
                return true;
            }
        }
        false
    }
}

/// A scripted live entity.
pub struct TestEntity {
    pub prototype: String,
    pub position: Vector3,
    pub orientation: Quat,
    pub owner: String,
    pub network_id: NetworkId,
    pub persistent: bool,
    pub opt_out: bool,
    pub active: bool,
    pub fail_reset: bool,
    pub components: Vec<(ComponentKey, TestComponent)>,
}

impl TestEntity {
    pub fn new(prototype: &str, owner: &str) -> Self {
        Self {
            prototype: prototype.to_string(),
            position: Vector3::zero(),
            orientation: Quat::identity(),
            owner: owner.to_string(),
            network_id: NETWORK_ID_UNSET,
            persistent: false,
            opt_out: false,
            active: true,
            fail_reset: false,
            components: vec![(ComponentKey::new("", "Score"), TestComponent::score(0))],
        }
    }

    pub fn with_points(mut self, points: i64) -> Self {
        self.components[0].1 = TestComponent::score(points);
        self
    }

    pub fn persistent(mut self, network_id: NetworkId) -> Self {
        self.persistent = true;
        self.network_id = network_id;
        self
    }

    pub fn opted_out(mut self) -> Self {
        self.opt_out = true;
        self
    }

    pub fn shared(self) -> Rc<RefCell<TestEntity>> {
        Rc::new(RefCell::new(self))
    }

    pub fn points(&self) -> i64 {
        match self.components[0].1.field("points") {
            Some(FieldValue::Int(v)) => *v,
            _ => panic!("score component lost its points field"),
        }
    }
}

impl ReplicatedEntity for TestEntity {
    fn prototype_name(&self) -> &str {
        &self.prototype
    }

    fn position(&self) -> Vector3 {
        self.position
    }

    fn orientation(&self) -> Quat {
        self.orientation
    }

    fn set_pose(&mut self, position: Vector3, orientation: Quat) {
        self.position = position;
        self.orientation = orientation;
    }

    fn owner_identity(&self) -> String {
        self.owner.clone()
    }

    fn set_owner_identity(&mut self, identity: &str) {
        self.owner = identity.to_string();
    }

    fn network_id(&self) -> NetworkId {
        self.network_id
    }

    fn reset_network_id(&mut self) -> HostResult<()> {
        if self.fail_reset {
            return Err("simulated reset failure".to_string());
        }
        self.network_id = NETWORK_ID_UNSET;
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        self.persistent
    }

    fn migration_opt_out(&self) -> bool {
        self.opt_out
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn visit_components(&self, visit: &mut dyn FnMut(&ComponentKey, &dyn ReplicatedComponent)) {
        for (key, component) in &self.components {
            visit(key, component);
        }
    }

    fn component_mut(&mut self, key: &ComponentKey) -> Option<&mut dyn ReplicatedComponent> {
        for (k, component) in self.components.iter_mut() {
            if k == key {
                return Some(component);
            }
        }
        None
    }
}

/// Calls recorded by the mock driver, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    StartClient,
    StopClient,
    StartServer,
    StopServer,
    Instantiate(String),
    Spawn(EntityId),
    Despawn(EntityId),
    RebuildObservers,
}

type PrototypeFactory = Box<dyn Fn() -> TestEntity>;

/// Shared, inspectable state behind the mock driver.
pub struct DriverState {
    pub local_identity: String,
    pub client_started: bool,
    pub server_started: bool,
    pub calls: Vec<DriverCall>,
    pub prototypes: HashMap<String, PrototypeFactory>,
    pub next_id: EntityId,
    /// Entities handed out by `instantiate`, in creation order.
    pub restored: Vec<(EntityId, Rc<RefCell<TestEntity>>)>,
}

impl DriverState {
    pub fn register_prototype(&mut self, name: &str, factory: impl Fn() -> TestEntity + 'static) {
        self.prototypes.insert(name.to_string(), Box::new(factory));
    }

    pub fn call_count(&self, call: &DriverCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn restored_entity(&self, owner: &str) -> Rc<RefCell<TestEntity>> {
        self.restored
            .iter()
            .find(|(_, e)| e.borrow().owner == owner)
            .map(|(_, e)| e.clone())
            .unwrap_or_else(|| panic!("no restored entity owned by '{}'", owner))
    }
}

/// `SessionDriver` double recording every request.
pub struct MockDriver {
    state: Rc<RefCell<DriverState>>,
}

impl MockDriver {
    pub fn new(local_identity: &str) -> (Self, Rc<RefCell<DriverState>>) {
        let state = Rc::new(RefCell::new(DriverState {
            local_identity: local_identity.to_string(),
            client_started: false,
            server_started: false,
            calls: Vec::new(),
            prototypes: HashMap::new(),
            next_id: 1000,
            restored: Vec::new(),
        }));
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

impl SessionDriver for MockDriver {
    fn start_client(&mut self) {
        let mut state = self.state.borrow_mut();
        state.client_started = true;
        state.calls.push(DriverCall::StartClient);
    }

    fn stop_client(&mut self) {
        let mut state = self.state.borrow_mut();
        state.client_started = false;
        state.calls.push(DriverCall::StopClient);
    }

    fn start_server(&mut self) {
        let mut state = self.state.borrow_mut();
        state.server_started = true;
        state.calls.push(DriverCall::StartServer);
    }

    fn stop_server(&mut self) {
        let mut state = self.state.borrow_mut();
        state.server_started = false;
        state.calls.push(DriverCall::StopServer);
    }

    fn is_client_started(&self) -> bool {
        self.state.borrow().client_started
    }

    fn is_server_started(&self) -> bool {
        self.state.borrow().server_started
    }

    fn local_identity(&self) -> String {
        self.state.borrow().local_identity.clone()
    }

    fn instantiate(
        &mut self,
        prototype_name: &str,
        position: Vector3,
        orientation: Quat,
    ) -> HostResult<(EntityId, SharedEntity)> {
        let mut state = self.state.borrow_mut();
        state
            .calls
            .push(DriverCall::Instantiate(prototype_name.to_string()));
        let mut entity = {
            let factory = state
                .prototypes
                .get(prototype_name)
                .ok_or_else(|| format!("prototype '{}' is not registered", prototype_name))?;
            factory()
        };
        entity.position = position;
        entity.orientation = orientation;
        state.next_id += 1;
        let id = state.next_id;
        let rc = Rc::new(RefCell::new(entity));
        state.restored.push((id, rc.clone()));
        let shared: SharedEntity = rc;
        Ok((id, shared))
    }

    fn spawn(&mut self, id: EntityId) {
        self.state.borrow_mut().calls.push(DriverCall::Spawn(id));
    }

    fn despawn(&mut self, id: EntityId) {
        self.state.borrow_mut().calls.push(DriverCall::Despawn(id));
    }

    fn rebuild_observers(&mut self) {
        self.state.borrow_mut().calls.push(DriverCall::RebuildObservers);
    }
}

/// Attach an event recorder to a coordinator.
pub fn record_events(coordinator: &mut MigrationCoordinator) -> Rc<RefCell<Vec<MigrationEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    coordinator.on_event(Box::new(move |event| sink.borrow_mut().push(event)));
    events
}
