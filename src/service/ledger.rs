// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event-sourced ledger service

use std::sync::Arc;

use tracing::info;

use crate::domain::invariants::{
    validate_allocate, validate_attach, validate_business_timestamp, validate_deallocate,
    validate_detach, validate_receive,
};
use crate::domain::{Agent, AgentId, Device, DeviceId};
use crate::errors::LedgerResult;
use crate::event_store::{EventStore, MemoryEventStore, StoredEvent};
use crate::events::{DeviceEvent, EventKind, EventPayload, GeoPoint, ReceiverType};
use crate::projection::{
    self, ComponentsView, DeviceView, DurabilityView, HolderView, MetricsView, OwnersView,
    ParentView, RunningTimeView,
};
use crate::registry::{AgentRegistry, AgentUserRegistry, DeviceRegistry};

use super::requests::{DeviceDraft, EventContext, RegisterRequest};

/// Device traceability ledger
///
/// Owns the event store and the identity registries and exposes one
/// write method per lifecycle event kind, plus the derived readers.
/// Reads fold a snapshot of the history; writes are guarded and appended
/// with optimistic per-device concurrency control.
pub struct Ledger {
    store: Arc<dyn EventStore>,
    devices: DeviceRegistry,
    agents: AgentRegistry,
    agent_users: AgentUserRegistry,
}

impl Ledger {
    /// Create a ledger over the given store
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            devices: DeviceRegistry::new(),
            agents: AgentRegistry::new(),
            agent_users: AgentUserRegistry::new(),
        }
    }

    /// Create a ledger over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryEventStore::new()))
    }

    // ------------------------------------------------------------------
    // Agents
    // ------------------------------------------------------------------

    /// Register a recording agent with a unique name
    pub fn register_agent(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> LedgerResult<Agent> {
        Ok(self.agents.register(name, description)?)
    }

    /// Find a registered agent by name
    pub fn find_agent(&self, name: &str) -> Option<Agent> {
        self.agents.find_by_name(name)
    }

    // ------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------

    /// Register a device, creating it and its components when unknown
    ///
    /// Never fails on relationship grounds; a repeated registration is a
    /// snapshot appending a fresh Register event on the same device.
    pub fn register(&self, request: RegisterRequest) -> LedgerResult<StoredEvent> {
        let ctx = request.context;
        self.agents.get(ctx.agent)?;

        let device = self
            .devices
            .resolve_or_create(request.device.into_new_device()?);
        let components = self.resolve_components(request.components)?;

        let history_len = self.store.version(device.id).unwrap_or(0);
        let event = self
            .build(device.id, &ctx, EventPayload::Register)
            .with_components(components);

        let stored = self.store.append(event, Some(history_len))?;
        info!(device = %device, sequence = stored.sequence, "device registered");
        Ok(stored)
    }

    /// Attach components to a device
    ///
    /// Fails atomically when any component is already attached somewhere.
    pub fn add(
        &self,
        device: &str,
        components: Vec<DeviceDraft>,
        ctx: EventContext,
    ) -> LedgerResult<StoredEvent> {
        let device = self.resolve_target(device, ctx.agent)?;
        let components = self.resolve_components(components)?;

        for component in &components {
            let related = self.store.events_related_to(*component);
            validate_attach(*component, projection::parent(&related, *component))?;
        }

        let version = self.store.version(device.id).unwrap_or(0);
        let event = self
            .build(device.id, &ctx, EventPayload::Add)
            .with_components(components);
        Ok(self.store.append(event, Some(version))?)
    }

    /// Detach components from a device
    ///
    /// Fails atomically when any component is not currently attached to
    /// the target.
    pub fn remove(
        &self,
        device: &str,
        components: Vec<DeviceDraft>,
        ctx: EventContext,
    ) -> LedgerResult<StoredEvent> {
        let device = self.resolve_target(device, ctx.agent)?;
        let components = self.resolve_components(components)?;

        for component in &components {
            let related = self.store.events_related_to(*component);
            validate_detach(
                device.id,
                *component,
                projection::parent(&related, *component),
            )?;
        }

        let version = self.store.version(device.id).unwrap_or(0);
        let event = self
            .build(device.id, &ctx, EventPayload::Remove)
            .with_components(components);
        Ok(self.store.append(event, Some(version))?)
    }

    /// Record that a device was recycled
    ///
    /// Requires a business timestamp: durability and open usage
    /// intervals consume it.
    pub fn recycle(
        &self,
        device: &str,
        components: Vec<DeviceDraft>,
        ctx: EventContext,
    ) -> LedgerResult<StoredEvent> {
        let device = self.resolve_target(device, ctx.agent)?;
        validate_business_timestamp(EventKind::Recycle, ctx.occurred_at)?;
        let components = self.resolve_components(components)?;

        let version = self.store.version(device.id).unwrap_or(0);
        let event = self
            .build(device.id, &ctx, EventPayload::Recycle)
            .with_components(components);
        Ok(self.store.append(event, Some(version))?)
    }

    /// Record that a device was collected
    pub fn collect(
        &self,
        device: &str,
        components: Vec<DeviceDraft>,
        ctx: EventContext,
    ) -> LedgerResult<StoredEvent> {
        let device = self.resolve_target(device, ctx.agent)?;
        let components = self.resolve_components(components)?;

        let version = self.store.version(device.id).unwrap_or(0);
        let event = self
            .build(device.id, &ctx, EventPayload::Collect)
            .with_components(components);
        Ok(self.store.append(event, Some(version))?)
    }

    /// Transfer custody of a device to another agent
    pub fn migrate(
        &self,
        device: &str,
        to: AgentId,
        ctx: EventContext,
    ) -> LedgerResult<StoredEvent> {
        let device = self.resolve_target(device, ctx.agent)?;
        self.agents.get(to)?;

        let version = self.store.version(device.id).unwrap_or(0);
        let event = self.build(device.id, &ctx, EventPayload::Migrate { to });
        Ok(self.store.append(event, Some(version))?)
    }

    /// Allocate a device to an external owner
    pub fn allocate(
        &self,
        device: &str,
        owner_url: &str,
        ctx: EventContext,
    ) -> LedgerResult<StoredEvent> {
        let device = self.resolve_target(device, ctx.agent)?;

        let history = self.store.events_for(device.id);
        let owner = self.agent_users.get_or_create(owner_url);
        validate_allocate(
            device.id,
            owner.id,
            owner_url,
            &projection::owners(&history),
        )?;

        let event = self.build(device.id, &ctx, EventPayload::Allocate { owner: owner.id });
        Ok(self.store.append(event, Some(history.len() as u64))?)
    }

    /// Deallocate a device from an external owner
    pub fn deallocate(
        &self,
        device: &str,
        owner_url: &str,
        ctx: EventContext,
    ) -> LedgerResult<StoredEvent> {
        let device = self.resolve_target(device, ctx.agent)?;

        let history = self.store.events_for(device.id);
        let owner = validate_deallocate(
            device.id,
            self.agent_users.find_by_url(owner_url).map(|u| u.id),
            owner_url,
            &projection::owners(&history),
        )?;

        let event = self.build(device.id, &ctx, EventPayload::Deallocate { owner });
        Ok(self.store.append(event, Some(history.len() as u64))?)
    }

    /// Record reception of a device by its current owner
    pub fn receive(
        &self,
        device: &str,
        receiver: &str,
        receiver_type: ReceiverType,
        ctx: EventContext,
    ) -> LedgerResult<StoredEvent> {
        let device = self.resolve_target(device, ctx.agent)?;

        let history = self.store.events_for(device.id);
        let owner_urls = self.owner_urls(&history);
        validate_receive(device.id, &ctx.by_user, &owner_urls)?;

        let event = self.build(
            device.id,
            &ctx,
            EventPayload::Receive {
                receiver: receiver.to_string(),
                receiver_type,
            },
        );
        Ok(self.store.append(event, Some(history.len() as u64))?)
    }

    /// Record where a device currently is
    pub fn locate(
        &self,
        device: &str,
        point: GeoPoint,
        ctx: EventContext,
    ) -> LedgerResult<StoredEvent> {
        let device = self.resolve_target(device, ctx.agent)?;

        let version = self.store.version(device.id).unwrap_or(0);
        let event = self
            .build(device.id, &ctx, EventPayload::Locate { point })
            .with_location(point);
        Ok(self.store.append(event, Some(version))?)
    }

    /// Record proof that a device is in use
    ///
    /// Requires a business timestamp: it opens a usage interval.
    pub fn usage_proof(&self, device: &str, ctx: EventContext) -> LedgerResult<StoredEvent> {
        let device = self.resolve_target(device, ctx.agent)?;
        validate_business_timestamp(EventKind::UsageProof, ctx.occurred_at)?;

        let version = self.store.version(device.id).unwrap_or(0);
        let event = self.build(device.id, &ctx, EventPayload::UsageProof);
        Ok(self.store.append(event, Some(version))?)
    }

    /// Record that a device stopped being used
    ///
    /// Requires a business timestamp: it closes the open usage interval.
    pub fn stop_usage(&self, device: &str, ctx: EventContext) -> LedgerResult<StoredEvent> {
        let device = self.resolve_target(device, ctx.agent)?;
        validate_business_timestamp(EventKind::StopUsage, ctx.occurred_at)?;

        let version = self.store.version(device.id).unwrap_or(0);
        let event = self.build(device.id, &ctx, EventPayload::StopUsage);
        Ok(self.store.append(event, Some(version))?)
    }

    // ------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------

    /// Resolve a lookup token (internal id, escaped URI or hardware id)
    pub fn lookup_device(&self, token: &str) -> LedgerResult<Device> {
        Ok(self.devices.lookup(token)?)
    }

    /// Identity plus derived composition and ownership
    pub fn device_view(&self, token: &str) -> LedgerResult<DeviceView> {
        let device = self.devices.lookup(token)?;
        let history = self.store.events_for(device.id);

        Ok(DeviceView {
            id: device.id,
            url: device.url,
            hardware_id: device.hardware_id,
            kind: device.kind,
            components: projection::components(&history),
            owners: self.owner_urls(&history),
        })
    }

    /// Current component set
    pub fn components(&self, token: &str) -> LedgerResult<ComponentsView> {
        let device = self.devices.lookup(token)?;
        let history = self.store.events_for(device.id);
        Ok(ComponentsView {
            device: device.id,
            components: projection::components(&history),
        })
    }

    /// Current parent, if attached
    pub fn parent(&self, token: &str) -> LedgerResult<ParentView> {
        let device = self.devices.lookup(token)?;
        let related = self.store.events_related_to(device.id);
        Ok(ParentView {
            device: device.id,
            parent: projection::parent(&related, device.id),
        })
    }

    /// Agent currently holding custody
    pub fn holder(&self, token: &str) -> LedgerResult<HolderView> {
        let device = self.devices.lookup(token)?;
        let history = self.store.events_for(device.id);
        let holder = projection::holder(&history, device.id)?;
        Ok(HolderView {
            device: device.id,
            holder,
        })
    }

    /// Current owner set, by URL
    pub fn owners(&self, token: &str) -> LedgerResult<OwnersView> {
        let device = self.devices.lookup(token)?;
        let history = self.store.events_for(device.id);
        Ok(OwnersView {
            device: device.id,
            owners: self.owner_urls(&history),
        })
    }

    /// Accumulated usage time as of now
    pub fn running_time(&self, token: &str) -> LedgerResult<RunningTimeView> {
        let device = self.devices.lookup(token)?;
        let history = self.store.events_for(device.id);
        Ok(RunningTimeView {
            device: device.id,
            seconds: projection::running_time(&history),
        })
    }

    /// Lifetime in whole years; fails until the device is recycled
    pub fn durability(&self, token: &str) -> LedgerResult<DurabilityView> {
        let device = self.devices.lookup(token)?;
        let history = self.store.events_for(device.id);
        let years = projection::durability(&history, device.id, device.manufacture_date)?;
        Ok(DurabilityView {
            device: device.id,
            years,
        })
    }

    /// Usage metrics; durability is absent until recycled
    pub fn metrics(&self, token: &str) -> LedgerResult<MetricsView> {
        let device = self.devices.lookup(token)?;
        let history = self.store.events_for(device.id);
        Ok(MetricsView {
            device: device.id,
            running_time: projection::running_time(&history),
            durability: projection::durability(&history, device.id, device.manufacture_date)
                .ok(),
        })
    }

    /// Full trace: events targeting the device or listing it as component
    pub fn events(&self, token: &str) -> LedgerResult<Vec<StoredEvent>> {
        let device = self.devices.lookup(token)?;
        Ok(self.store.events_related_to(device.id))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn resolve_target(&self, token: &str, agent: AgentId) -> LedgerResult<Device> {
        self.agents.get(agent)?;
        Ok(self.devices.lookup(token)?)
    }

    fn resolve_components(&self, drafts: Vec<DeviceDraft>) -> LedgerResult<Vec<DeviceId>> {
        drafts
            .into_iter()
            .map(|draft| {
                let new_device = draft.into_new_device()?;
                Ok(self.devices.resolve_or_create(new_device).id)
            })
            .collect()
    }

    fn build(&self, device: DeviceId, ctx: &EventContext, payload: EventPayload) -> DeviceEvent {
        let mut event = DeviceEvent::new(device, ctx.agent, ctx.by_user.clone(), payload);
        if let Some(at) = ctx.occurred_at {
            event = event.with_occurred_at(at);
        }
        if let Some(location) = ctx.location {
            event = event.with_location(location);
        }
        event
    }

    fn owner_urls(&self, history: &[StoredEvent]) -> Vec<String> {
        projection::owners(history)
            .into_iter()
            .filter_map(|id| self.agent_users.get(id).map(|u| u.url))
            .collect()
    }
}
