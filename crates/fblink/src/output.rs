use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use fblink_codec::Value;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ValueOutput {
    kind: &'static str,
    array: bool,
    value: serde_json::Value,
}

/// Prints one received frame's worth of decoded values to stdout.
pub fn print_values(values: &[Value], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<ValueOutput> = values
                .iter()
                .map(|v| ValueOutput {
                    kind: v.kind_name(),
                    array: v.is_array(),
                    value: json_value(v),
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SLOT", "TYPE", "VALUE"]);
            for (index, value) in values.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    describe(value),
                    render(value),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (index, value) in values.iter().enumerate() {
                println!("[{index}] {} = {}", describe(value), render(value));
            }
        }
    }
}

fn describe(value: &Value) -> String {
    if value.is_array() {
        format!("{} array", value.kind_name())
    } else {
        value.kind_name().to_string()
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Bool(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Long(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::DateAndTime(v) => v.to_string(),
        Value::Str(v) => v.clone(),
        Value::BoolArray(v) => join(v.iter()),
        Value::IntArray(v) => join(v.iter()),
        Value::LongArray(v) => join(v.iter()),
        Value::FloatArray(v) => join(v.iter()),
        Value::DoubleArray(v) => join(v.iter()),
        Value::DateAndTimeArray(v) => join(v.iter()),
        Value::StrArray(v) => v.join(","),
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn json_value(value: &Value) -> serde_json::Value {
    use serde_json::json;
    match value {
        Value::Bool(v) => json!(v),
        Value::Int(v) => json!(v),
        Value::Long(v) => json!(v),
        Value::Float(v) => json!(v),
        Value::Double(v) => json!(v),
        Value::DateAndTime(v) => json!(v.to_string()),
        Value::Str(v) => json!(v),
        Value::BoolArray(v) => json!(v),
        Value::IntArray(v) => json!(v),
        Value::LongArray(v) => json!(v),
        Value::FloatArray(v) => json!(v),
        Value::DoubleArray(v) => json!(v),
        Value::DateAndTimeArray(v) => {
            json!(v.iter().map(ToString::to_string).collect::<Vec<_>>())
        }
        Value::StrArray(v) => json!(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_render_bare() {
        assert_eq!(render(&Value::Double(5.0)), "5");
        assert_eq!(render(&Value::Bool(true)), "true");
        assert_eq!(render(&Value::Str("five".to_owned())), "five");
    }

    #[test]
    fn arrays_render_comma_separated() {
        assert_eq!(render(&Value::IntArray(vec![1, 2, 3])), "1,2,3");
        assert_eq!(render(&Value::BoolArray(vec![true, false])), "true,false");
    }

    #[test]
    fn json_values_keep_native_types() {
        assert_eq!(json_value(&Value::Int(5)), serde_json::json!(5));
        assert_eq!(
            json_value(&Value::DoubleArray(vec![1.0, 2.0])),
            serde_json::json!([1.0, 2.0])
        );
        assert_eq!(
            json_value(&Value::Str("five".to_owned())),
            serde_json::json!("five")
        );
    }
}
