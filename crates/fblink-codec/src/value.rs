use fblink_types::DateAndTime;

/// A decoded slot value.
///
/// The wire's many integer kinds collapse to two decoded widths: everything
/// up to DINT/UDINT becomes `Int`, the 64-bit kinds become `Long`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    DateAndTime(DateAndTime),
    Str(String),
    BoolArray(Vec<bool>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    DateAndTimeArray(Vec<DateAndTime>),
    StrArray(Vec<String>),
}

impl Value {
    /// Name of the decoded kind, matching [`fblink_types::WireType::kind_name`].
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) | Value::BoolArray(_) => "bool",
            Value::Int(_) | Value::IntArray(_) => "int",
            Value::Long(_) | Value::LongArray(_) => "long",
            Value::Float(_) | Value::FloatArray(_) => "float",
            Value::Double(_) | Value::DoubleArray(_) => "double",
            Value::DateAndTime(_) | Value::DateAndTimeArray(_) => "date and time",
            Value::Str(_) | Value::StrArray(_) => "string",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Value::BoolArray(_)
                | Value::IntArray(_)
                | Value::LongArray(_)
                | Value::FloatArray(_)
                | Value::DoubleArray(_)
                | Value::DateAndTimeArray(_)
                | Value::StrArray(_)
        )
    }

    fn shape_name(&self) -> &'static str {
        if self.is_array() {
            "array"
        } else {
            "value"
        }
    }

    /// `"int array"` style description for diagnostics.
    pub(crate) fn described(&self) -> (&'static str, &'static str) {
        (self.kind_name(), self.shape_name())
    }
}
