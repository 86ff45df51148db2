use std::net::SocketAddr;

use fblink_codec::{Schema, SchemaSlot};
use fblink_transport::{LinkParams, ServiceType};
use fblink_types::WireType;

use crate::error::Result;
use crate::socket::FbSocket;

/// Everything needed to stand up one communication session: the address,
/// the service kind, and the declared payload schemas for both directions.
///
/// Directions are named from the remote function block's point of view, the
/// convention the 61499 service blocks use: the *input* schema describes the
/// block's data inputs, i.e. what this side encodes and sends; the *output*
/// schema describes the block's outputs, what this side receives.
///
/// Both schemas start out holding a single NONE placeholder, meaning "this
/// direction carries no payload, only acknowledgements". The first real slot
/// added to a direction replaces the placeholder; adding NONE explicitly is
/// always a no-op, so NONE can never sit next to payload slots.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    addr: SocketAddr,
    service: ServiceType,
    inputs: Schema,
    outputs: Schema,
}

impl ConnectionParams {
    pub fn new(addr: SocketAddr, service: ServiceType) -> Self {
        Self {
            addr,
            service,
            inputs: placeholder_schema(),
            outputs: placeholder_schema(),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn service(&self) -> ServiceType {
        self.service
    }

    pub fn inputs(&self) -> &Schema {
        &self.inputs
    }

    pub fn outputs(&self) -> &Schema {
        &self.outputs
    }

    /// Declares one scalar slot in the sending direction.
    pub fn add_input(&mut self, ty: WireType) {
        push_slot(&mut self.inputs, SchemaSlot::scalar(ty));
    }

    /// Declares one array slot of `len` elements in the sending direction.
    pub fn add_input_array(&mut self, ty: WireType, len: usize) {
        push_slot(&mut self.inputs, SchemaSlot::array(ty, len));
    }

    /// Declares one scalar slot in the receiving direction.
    pub fn add_output(&mut self, ty: WireType) {
        push_slot(&mut self.outputs, SchemaSlot::scalar(ty));
    }

    /// Declares one array slot of `len` elements in the receiving direction.
    pub fn add_output_array(&mut self, ty: WireType, len: usize) {
        push_slot(&mut self.outputs, SchemaSlot::array(ty, len));
    }

    /// Declares the same scalar slot in both directions.
    pub fn add_input_output(&mut self, ty: WireType) {
        self.add_input(ty);
        self.add_output(ty);
    }

    /// Declares the same array slot in both directions.
    pub fn add_input_output_array(&mut self, ty: WireType, len: usize) {
        self.add_input_array(ty, len);
        self.add_output_array(ty, len);
    }

    /// Whether both directions declare equivalent schemas. Symmetric
    /// sessions share one codec for both directions.
    pub fn symmetric(&self) -> bool {
        self.inputs == self.outputs
    }

    pub fn link_params(&self) -> LinkParams {
        LinkParams::new(self.addr, self.service)
    }

    /// Opens the connection and builds the typed socket over it.
    pub fn make_socket(&self) -> Result<FbSocket> {
        FbSocket::open(self)
    }
}

fn placeholder_schema() -> Schema {
    let mut schema = Schema::new();
    schema.push(SchemaSlot::scalar(WireType::None));
    schema
}

fn push_slot(schema: &mut Schema, slot: SchemaSlot) {
    if slot.ty == WireType::None {
        return;
    }
    if schema.slots() == [SchemaSlot::scalar(WireType::None)] {
        schema.clear();
    }
    schema.push(slot);
}
