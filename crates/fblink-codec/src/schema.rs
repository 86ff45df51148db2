use fblink_types::WireType;

/// One schema position: a wire type and its arity (1 for a scalar).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaSlot {
    pub ty: WireType,
    pub len: usize,
}

impl SchemaSlot {
    pub fn scalar(ty: WireType) -> Self {
        Self { ty, len: 1 }
    }

    pub fn array(ty: WireType, len: usize) -> Self {
        Self { ty, len }
    }

    pub fn is_array(&self) -> bool {
        self.len > 1
    }

    /// Bytes this slot contributes to a full frame.
    ///
    /// Arrays account for the array marker, the 2-byte element count and the
    /// shared element tag, plus one payload per element.
    pub fn byte_len(&self) -> usize {
        if self.is_array() {
            4 + self.ty.encoded_len().saturating_sub(1).max(1) * self.len
        } else {
            self.ty.encoded_len()
        }
    }
}

/// The fixed, ordered list of slots describing one direction's payload
/// shape. Established once per codec instance and never mutated afterwards.
///
/// Two schemas are equivalent when they have the same length and the same
/// (type, arity) pairs position by position; `PartialEq` implements exactly
/// that rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    slots: Vec<SchemaSlot>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, slot: SchemaSlot) {
        self.slots.push(slot);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[SchemaSlot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&SchemaSlot> {
        self.slots.get(index)
    }

    /// Size of one fully encoded frame of this schema.
    pub fn frame_capacity(&self) -> usize {
        self.slots.iter().map(SchemaSlot::byte_len).sum()
    }
}

impl FromIterator<SchemaSlot> for Schema {
    fn from_iter<T: IntoIterator<Item = SchemaSlot>>(iter: T) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}
