//! Publication-window indicator for blocks in the editing surface.
//!
//! Blocks that are hidden, not yet started or already expired are dimmed so the
//! editor can tell at a glance what visitors will not see.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};

pub const DIMMED_OPACITY: f32 = 0.25;
pub const FULL_OPACITY: f32 = 1.0;

/// Block settings that drive the indicator. Values arrive as the editor stores them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisibilitySettings {
    pub hide_block: Value,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl VisibilitySettings {
    fn is_hidden(&self) -> bool {
        match &self.hide_block {
            Value::Bool(flag) => *flag,
            Value::Number(number) => number.as_i64() == Some(1),
            Value::String(raw) => matches!(raw.trim(), "1" | "true"),
            _ => false,
        }
    }
}

/// Compute the display opacity for a block at `now`.
pub fn block_opacity(settings: &VisibilitySettings, now: OffsetDateTime) -> f32 {
    if settings.is_hidden() {
        return DIMMED_OPACITY;
    }

    let start = settings.start_date.as_deref().map(str::trim).unwrap_or("");
    let end = settings.end_date.as_deref().map(str::trim).unwrap_or("");
    if start.is_empty() && end.is_empty() {
        return FULL_OPACITY;
    }

    // Unparsable dates never dim the block.
    if parse_setting_date(start).is_some_and(|start| start > now) {
        return DIMMED_OPACITY;
    }
    if parse_setting_date(end).is_some_and(|end| end < now) {
        return DIMMED_OPACITY;
    }

    FULL_OPACITY
}

/// Parse the date formats produced by the date pickers; naive values are taken as UTC.
pub fn parse_setting_date(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    let spaced = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(value) = PrimitiveDateTime::parse(raw, &spaced) {
        return Some(value.assume_utc());
    }

    let t_separated = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(value) = PrimitiveDateTime::parse(raw, &t_separated) {
        return Some(value.assume_utc());
    }

    let date_only = format_description!("[year]-[month]-[day]");
    Date::parse(raw, &date_only)
        .ok()
        .map(|date| date.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-12-24 12:00:00 UTC);

    fn settings(value: Value) -> VisibilitySettings {
        serde_json::from_value(value).expect("valid settings")
    }

    #[test]
    fn hidden_block_is_dimmed_regardless_of_dates() {
        let hidden = settings(json!({
            "hideBlock": "1",
            "startDate": "2020-01-01 00:00:00",
            "endDate": "2030-01-01 00:00:00"
        }));
        assert_eq!(block_opacity(&hidden, NOW), DIMMED_OPACITY);
    }

    #[test]
    fn empty_dates_show_block() {
        let open = settings(json!({ "hideBlock": "0", "startDate": "", "endDate": "" }));
        assert_eq!(block_opacity(&open, NOW), FULL_OPACITY);
        assert_eq!(block_opacity(&VisibilitySettings::default(), NOW), FULL_OPACITY);
    }

    #[test]
    fn future_start_dims_block() {
        let pending = settings(json!({ "startDate": "2025-01-01 00:00:00", "endDate": "" }));
        assert_eq!(block_opacity(&pending, NOW), DIMMED_OPACITY);
    }

    #[test]
    fn past_end_dims_block() {
        let expired = settings(json!({ "startDate": "", "endDate": "2024-12-01" }));
        assert_eq!(block_opacity(&expired, NOW), DIMMED_OPACITY);
    }

    #[test]
    fn running_window_shows_block() {
        let running = settings(json!({
            "startDate": "2024-12-01T00:00:00",
            "endDate": "2024-12-31T23:59:59Z"
        }));
        assert_eq!(block_opacity(&running, NOW), FULL_OPACITY);
    }

    #[test]
    fn unparsable_dates_do_not_dim() {
        let garbage = settings(json!({ "startDate": "soon", "endDate": "later" }));
        assert_eq!(block_opacity(&garbage, NOW), FULL_OPACITY);
    }

    #[test]
    fn boolean_and_numeric_hide_flags_are_honoured() {
        assert_eq!(
            block_opacity(&settings(json!({ "hideBlock": true })), NOW),
            DIMMED_OPACITY
        );
        assert_eq!(
            block_opacity(&settings(json!({ "hideBlock": 1 })), NOW),
            DIMMED_OPACITY
        );
        assert_eq!(
            block_opacity(&settings(json!({ "hideBlock": "0" })), NOW),
            FULL_OPACITY
        );
    }
}
