//! Conversions and the `string()` representation.

use std::collections::HashSet;

use crate::errors::{LegacyError, ValueError};
use crate::heap::{DictId, Heap, ListId};
use crate::number::string_to_number;
use crate::value::{Special, Value};

impl Heap {
    /// Number a value converts to in arithmetic.
    pub fn to_number(&self, value: &Value) -> Result<i64, ValueError> {
        match value {
            Value::Number(n) => Ok(*n),
            Value::String(text) => Ok(string_to_number(text)),
            Value::Special(Special::True) => Ok(1),
            Value::Special(Special::False | Special::Null) | Value::Unknown => Ok(0),
            Value::Float(_) => Err(ValueError::Conversion(LegacyError::FloatAsNumber)),
            Value::List(_) => Err(ValueError::Conversion(LegacyError::ListAsNumber)),
            Value::Dict(_) => Err(ValueError::Conversion(LegacyError::DictionaryAsNumber)),
            Value::Funcref(_) => Err(ValueError::Conversion(LegacyError::FuncrefAsNumber)),
        }
    }

    /// Truth value used by `if`, `while`, `&&`, `||` and `!`.
    pub fn truthy(&self, value: &Value) -> Result<bool, ValueError> {
        Ok(self.to_number(value)? != 0)
    }

    /// Text a value converts to for concatenation and `:echo` arguments.
    pub fn to_text(&self, value: &Value) -> Result<String, ValueError> {
        match value {
            Value::Number(n) => Ok(n.to_string()),
            Value::String(text) => Ok(text.to_string()),
            Value::Special(special) => Ok(special.name().to_string()),
            Value::Unknown => Ok(String::new()),
            Value::Float(_) => Err(ValueError::Conversion(LegacyError::FloatAsString)),
            Value::List(_) => Err(ValueError::Conversion(LegacyError::ListAsString)),
            Value::Dict(_) => Err(ValueError::Conversion(LegacyError::DictionaryAsString)),
            Value::Funcref(_) => Err(ValueError::Conversion(LegacyError::FuncrefAsString)),
        }
    }

    /// Representation produced by `string()`.
    ///
    /// A container met again while it is still being printed shows as
    /// `[...]` or `{...}`. Dictionary keys are printed in sorted order.
    pub fn repr(&self, value: &Value) -> Result<String, ValueError> {
        let mut out = String::new();
        let mut printing = Printing::default();
        self.repr_into(value, &mut out, &mut printing)?;
        Ok(out)
    }

    fn repr_into(&self, value: &Value, out: &mut String, printing: &mut Printing) -> Result<(), ValueError> {
        match value {
            Value::Number(n) => out.push_str(&n.to_string()),
            Value::Float(f) => out.push_str(&format_float(*f)),
            Value::String(text) => push_quoted(out, text),
            Value::Funcref(name) => {
                out.push_str("function(");
                push_quoted(out, name);
                out.push(')');
            }
            Value::Special(special) => out.push_str(special.name()),
            Value::Unknown => {}
            Value::List(id) => {
                if !printing.lists.insert(*id) {
                    out.push_str("[...]");
                    return Ok(());
                }
                out.push('[');
                for (index, item) in self.list_values(*id)?.into_iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.repr_into(item, out, printing)?;
                }
                out.push(']');
                printing.lists.remove(id);
            }
            Value::Dict(id) => {
                if !printing.dicts.insert(*id) {
                    out.push_str("{...}");
                    return Ok(());
                }
                out.push('{');
                for (index, key) in self.dict_keys(*id)?.into_iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    push_quoted(out, &key);
                    out.push_str(": ");
                    self.repr_into(self.dict_get(*id, &key)?, out, printing)?;
                }
                out.push('}');
                printing.dicts.remove(id);
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Printing {
    lists: HashSet<ListId>,
    dicts: HashSet<DictId>,
}

fn push_quoted(out: &mut String, text: &str) {
    out.push('\'');
    out.push_str(&text.replace('\'', "''"));
    out.push('\'');
}

/// Floats always print with a fraction or an exponent, so they read back
/// as Floats.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let text = if value != 0.0 && (value.abs() >= 1e15 || value.abs() < 1e-4) {
        let text = format!("{value:e}");
        match text.split_once('e') {
            Some((mantissa, exponent)) if !mantissa.contains('.') => format!("{mantissa}.0e{exponent}"),
            _ => text,
        }
    } else {
        value.to_string()
    };
    if text.contains(['.', 'e']) {
        text
    } else {
        format!("{text}.0")
    }
}
