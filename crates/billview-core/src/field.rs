//! Form field model and the host form boundary.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::error::HostError;

/// Field types the binding controller distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldKind {
    Date,
    Text,
    LongText,
    Numeric,
    Currency,
    Select,
    Checkbox,
}

impl FieldKind {
    /// Map a host type name (`"date"`, `"currency"`, `"textarea"`, ...) to a kind.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "date" => Some(FieldKind::Date),
            "text" | "email" | "url" | "phone" => Some(FieldKind::Text),
            "textarea" | "longtext" => Some(FieldKind::LongText),
            "integer" | "float" | "decimal" | "percent" => Some(FieldKind::Numeric),
            "currency" | "currency2" => Some(FieldKind::Currency),
            "select" | "multiselect" => Some(FieldKind::Select),
            "checkbox" => Some(FieldKind::Checkbox),
            _ => None,
        }
    }
}

/// A coerced value ready to be written to the host form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    Text(String),
    Date {
        date: NaiveDate,
        /// The date rendered in the host's display convention.
        display: String,
    },
}

impl FieldValue {
    /// The value as the host would display it.
    pub fn display(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::Date { display, .. } => display,
        }
    }
}

/// Where a focused field's value is written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldTarget {
    /// A header-level field of the form.
    Body { field: String },
    /// A column on the current row of a line-item grid.
    GridRow { grid: String, row: usize, field: String },
}

impl FieldTarget {
    pub fn field(&self) -> &str {
        match self {
            FieldTarget::Body { field } | FieldTarget::GridRow { field, .. } => field,
        }
    }
}

/// Options passed with a body-field write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetOptions {
    /// Write without firing the host's field-change handlers.
    pub suppress_change_event: bool,
}

/// Raw text last parsed as a date, per field. Entries are only ever added or
/// overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldHistory {
    dates: BTreeMap<String, String>,
}

impl FieldHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, field: impl Into<String>, raw: impl Into<String>) {
        self.dates.insert(field.into(), raw.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.dates.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.dates.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// The bill-entry form the viewer writes into.
pub trait HostForm {
    /// Kind of a body-level field, or `None` if the form has no such field.
    fn field_kind(&self, field: &str) -> Option<FieldKind>;

    fn set_field_value(
        &mut self,
        field: &str,
        value: &FieldValue,
        options: SetOptions,
    ) -> Result<(), HostError>;

    /// Index of the grid's current (selected) row, if any.
    fn current_row(&self, grid: &str) -> Option<usize>;

    fn set_current_row_value(
        &mut self,
        grid: &str,
        field: &str,
        value: &FieldValue,
    ) -> Result<(), HostError>;

    /// Move input focus to `field`. Returns whether the field could be focused.
    fn focus_field(&mut self, field: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
struct MemoryGrid {
    current: Option<usize>,
    rows: Vec<BTreeMap<String, FieldValue>>,
}

/// In-memory [`HostForm`], for embedders without a live form and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    kinds: BTreeMap<String, FieldKind>,
    values: BTreeMap<String, FieldValue>,
    grids: BTreeMap<String, MemoryGrid>,
    read_only: BTreeSet<String>,
    focused: Option<String>,
    change_events: usize,
}

impl MemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body field.
    pub fn with_field(mut self, field: &str, kind: FieldKind) -> Self {
        self.kinds.insert(field.to_string(), kind);
        self
    }

    /// Add a grid with `rows` empty rows and the given current row.
    pub fn with_grid(mut self, grid: &str, rows: usize, current: Option<usize>) -> Self {
        self.grids.insert(
            grid.to_string(),
            MemoryGrid {
                current,
                rows: vec![BTreeMap::new(); rows],
            },
        );
        self
    }

    /// Make writes to `field` fail.
    pub fn with_read_only(mut self, field: &str) -> Self {
        self.read_only.insert(field.to_string());
        self
    }

    pub fn select_row(&mut self, grid: &str, row: Option<usize>) {
        if let Some(g) = self.grids.get_mut(grid) {
            g.current = row;
        }
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn row_value(&self, grid: &str, row: usize, field: &str) -> Option<&FieldValue> {
        self.grids.get(grid)?.rows.get(row)?.get(field)
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Number of writes that fired change handlers.
    pub fn change_events(&self) -> usize {
        self.change_events
    }

    /// Whether no value has been written anywhere.
    pub fn is_untouched(&self) -> bool {
        self.values.is_empty()
            && self
                .grids
                .values()
                .all(|g| g.rows.iter().all(BTreeMap::is_empty))
    }
}

impl HostForm for MemoryForm {
    fn field_kind(&self, field: &str) -> Option<FieldKind> {
        self.kinds.get(field).copied()
    }

    fn set_field_value(
        &mut self,
        field: &str,
        value: &FieldValue,
        options: SetOptions,
    ) -> Result<(), HostError> {
        if !self.kinds.contains_key(field) {
            return Err(HostError::new("set_field_value", field, "no such field"));
        }
        if self.read_only.contains(field) {
            return Err(HostError::new("set_field_value", field, "field is read-only"));
        }
        self.values.insert(field.to_string(), value.clone());
        if !options.suppress_change_event {
            self.change_events += 1;
        }
        Ok(())
    }

    fn current_row(&self, grid: &str) -> Option<usize> {
        self.grids.get(grid)?.current
    }

    fn set_current_row_value(
        &mut self,
        grid: &str,
        field: &str,
        value: &FieldValue,
    ) -> Result<(), HostError> {
        if self.read_only.contains(field) {
            return Err(HostError::new("set_current_row_value", field, "field is read-only"));
        }
        let g = self
            .grids
            .get_mut(grid)
            .ok_or_else(|| HostError::new("set_current_row_value", field, "no such grid"))?;
        let row = g
            .current
            .and_then(|i| g.rows.get_mut(i))
            .ok_or_else(|| HostError::new("set_current_row_value", field, "no current row"))?;
        row.insert(field.to_string(), value.clone());
        self.change_events += 1;
        Ok(())
    }

    fn focus_field(&mut self, field: &str) -> bool {
        let known = self.kinds.contains_key(field)
            || self
                .grids
                .values()
                .any(|g| g.current.is_some());
        if known {
            self.focused = Some(field.to_string());
        }
        known
    }
}
