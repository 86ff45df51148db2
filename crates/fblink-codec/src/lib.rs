//! Typed data buffer codec for the FORTE wire format.
//!
//! A [`DataBuffer`] is initialized once from a [`Schema`], an ordered list
//! of (wire type, arity) slots, and then drives both directions of the
//! exchange: typed `put_*` calls encode values into the backing byte buffer
//! in schema order, `send_data` flushes the frame through the layer below,
//! `recv_data` decodes an incoming frame back into typed slots, and the
//! `is_*`/`get_*` accessors consume them in the same order. A single forward
//! position cursor sequences both sides; there is no random access by name.

pub mod buffer;
pub mod error;
pub mod schema;
pub mod value;

pub use buffer::DataBuffer;
pub use error::{CodecError, Result};
pub use schema::{Schema, SchemaSlot};
pub use value::Value;
