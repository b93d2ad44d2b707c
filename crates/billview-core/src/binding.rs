//! Routing selected text into the focused form field.
//!
//! [`FieldBindingController`] remembers the last focused field and where it
//! lives (a body field or a column on a grid's current row), coerces selected
//! text to the field's kind and writes it through a [`HostForm`].

use tracing::{debug, warn};

use crate::currency::strip_currency;
use crate::date::{DateDisplayFormat, NumericDateOrder, parse_date};
use crate::error::BindingError;
use crate::field::{FieldHistory, FieldKind, FieldTarget, FieldValue, HostForm, SetOptions};

/// Suffix the host appends to the element id of formatted inputs.
const FORMATTED_SUFFIX: &str = "_formattedValue";

/// What to do when a date field receives text that is not a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateFallback {
    /// Fail with [`BindingError::DateParseFailure`] and leave the field alone.
    #[default]
    Abort,
    /// Write the trimmed raw text and let the host validate it.
    InsertRawText,
}

/// Options for [`FieldBindingController`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindingOptions {
    /// Fields whose focus never clears highlights
    /// (default: `inpt_category`, `memo`, `amount`).
    pub highlight_bypass: Vec<String>,
    /// Grid-row fields written verbatim without trimming or coercion
    /// (default: `memo`). Body fields of the same name are still trimmed.
    pub verbatim_fields: Vec<String>,
    /// Grids probed, in order, for a current row (default: `expense`, `item`).
    pub grid_candidates: Vec<String>,
    /// How dates are rendered for the host (default: `M/D/YYYY`).
    pub date_display: DateDisplayFormat,
    /// Reading of `N/N/YYYY` dates (default: month first).
    pub numeric_date_order: NumericDateOrder,
    pub date_fallback: DateFallback,
    /// Write body fields without firing host change handlers (default: `false`).
    pub suppress_change_event: bool,
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            highlight_bypass: vec!["inpt_category".into(), "memo".into(), "amount".into()],
            verbatim_fields: vec!["memo".into()],
            grid_candidates: vec!["expense".into(), "item".into()],
            date_display: DateDisplayFormat::default(),
            numeric_date_order: NumericDateOrder::default(),
            date_fallback: DateFallback::default(),
            suppress_change_event: false,
        }
    }
}

/// Whether the page highlights should be cleared after a focus change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightAction {
    Keep,
    Clear,
}

/// A completed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub target: FieldTarget,
    pub value: FieldValue,
    /// Whether focus could be returned to the field afterwards.
    pub focus_restored: bool,
}

/// Tracks the focused field and applies selected text to it.
#[derive(Debug, Clone, Default)]
pub struct FieldBindingController {
    options: BindingOptions,
    active: Option<String>,
    target: Option<FieldTarget>,
    history: FieldHistory,
}

/// Strip the host's formatted-input suffix from an element id.
pub fn normalize_field_id(raw: &str) -> &str {
    raw.strip_suffix(FORMATTED_SUFFIX).unwrap_or(raw)
}

impl FieldBindingController {
    pub fn new(options: BindingOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &BindingOptions {
        &self.options
    }

    /// The last focused field, if any.
    pub fn active_field(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Where the active field was resolved at focus time.
    pub fn target(&self) -> Option<&FieldTarget> {
        self.target.as_ref()
    }

    pub fn history(&self) -> &FieldHistory {
        &self.history
    }

    /// Record a focus change to the element `raw_id`.
    pub fn on_focus<F: HostForm + ?Sized>(&mut self, form: &F, raw_id: &str) -> HighlightAction {
        let field = normalize_field_id(raw_id).to_string();
        self.target = self.resolve(form, &field);
        debug!(field = %field, target = ?self.target, "field focused");

        let action = if self.options.highlight_bypass.contains(&field) {
            HighlightAction::Keep
        } else if let Some(previous) = self.history.get(&field) {
            debug!(field = %field, previous, "field has a previously applied date");
            HighlightAction::Clear
        } else {
            HighlightAction::Keep
        };
        self.active = Some(field);
        action
    }

    /// Record that the focused element lost focus. The active field is kept
    /// so a selection made next can still be applied to it.
    pub fn on_blur(&mut self) -> HighlightAction {
        HighlightAction::Clear
    }

    /// Coerce `text` for the active field and write it to the form.
    pub fn apply<F: HostForm + ?Sized>(
        &mut self,
        form: &mut F,
        text: &str,
    ) -> Result<WriteResult, BindingError> {
        let Some(field) = self.active.clone() else {
            debug!("no field focused; ignoring selection");
            return Err(BindingError::NoActiveField);
        };
        if text.trim().is_empty() {
            debug!(field = %field, "empty selection; nothing to apply");
            return Err(BindingError::NoTextToApply);
        }

        let target = match self.target.clone() {
            Some(FieldTarget::GridRow { grid, row, field }) => {
                let actual = form.current_row(&grid);
                if actual != Some(row) {
                    warn!(grid = %grid, expected = row, actual = ?actual, "grid row changed since focus");
                    return Err(BindingError::RowContextChanged {
                        grid,
                        expected: row,
                        actual,
                    });
                }
                FieldTarget::GridRow { grid, row, field }
            }
            Some(body @ FieldTarget::Body { .. }) if form.field_kind(&field).is_some() => body,
            _ => {
                debug!(field = %field, "field not on form body; probing grids");
                self.probe_grids(form, &field)
                    .ok_or_else(|| BindingError::FieldNotFound {
                        field: field.clone(),
                    })?
            }
        };

        let value = match &target {
            FieldTarget::Body { field } => {
                let kind = form
                    .field_kind(field)
                    .ok_or_else(|| BindingError::FieldNotFound {
                        field: field.clone(),
                    })?;
                self.coerce(field, kind, text)?
            }
            FieldTarget::GridRow { field, .. } => self.coerce_line_level(field, text),
        };

        let written = match &target {
            FieldTarget::Body { field } => form.set_field_value(
                field,
                &value,
                SetOptions {
                    suppress_change_event: self.options.suppress_change_event,
                },
            ),
            FieldTarget::GridRow { grid, field, .. } => {
                form.set_current_row_value(grid, field, &value)
            }
        };
        if let Err(err) = written {
            warn!(field = %field, error = %err, "host rejected write");
            return Err(err.into());
        }

        if matches!(value, FieldValue::Date { .. }) {
            self.history.record(field.clone(), text.trim());
        }

        let focus_restored = form.focus_field(&field);
        if !focus_restored {
            debug!(field = %field, "could not restore focus");
        }
        debug!(field = %field, value = value.display(), "applied selection");

        Ok(WriteResult {
            target,
            value,
            focus_restored,
        })
    }

    fn resolve<F: HostForm + ?Sized>(&self, form: &F, field: &str) -> Option<FieldTarget> {
        if form.field_kind(field).is_some() {
            return Some(FieldTarget::Body {
                field: field.to_string(),
            });
        }
        self.probe_grids(form, field)
    }

    fn probe_grids<F: HostForm + ?Sized>(&self, form: &F, field: &str) -> Option<FieldTarget> {
        self.options.grid_candidates.iter().find_map(|grid| {
            form.current_row(grid).map(|row| FieldTarget::GridRow {
                grid: grid.clone(),
                row,
                field: field.to_string(),
            })
        })
    }

    fn coerce(&self, field: &str, kind: FieldKind, text: &str) -> Result<FieldValue, BindingError> {
        match kind {
            FieldKind::Date => match parse_date(text, self.options.numeric_date_order) {
                Some(date) => Ok(FieldValue::Date {
                    date,
                    display: self.options.date_display.format(date),
                }),
                None => match self.options.date_fallback {
                    DateFallback::Abort => {
                        warn!(field, input = text, "could not parse date");
                        Err(BindingError::DateParseFailure {
                            input: text.to_string(),
                        })
                    }
                    DateFallback::InsertRawText => {
                        debug!(field, input = text, "date unparsed; inserting raw text");
                        Ok(FieldValue::Text(text.trim().to_string()))
                    }
                },
            },
            FieldKind::Text | FieldKind::LongText => Ok(FieldValue::Text(text.trim().to_string())),
            FieldKind::Numeric | FieldKind::Currency => Ok(FieldValue::Text(strip_currency(text))),
            FieldKind::Select | FieldKind::Checkbox => Err(BindingError::UnsupportedFieldType {
                field: field.to_string(),
                kind,
            }),
        }
    }

    fn coerce_line_level(&self, field: &str, text: &str) -> FieldValue {
        if self.is_verbatim(field) {
            FieldValue::Text(text.to_string())
        } else {
            FieldValue::Text(strip_currency(text))
        }
    }

    fn is_verbatim(&self, field: &str) -> bool {
        self.options.verbatim_fields.iter().any(|f| f == field)
    }
}
