use crate::scene::config::VisualConfig;

/// Separator used when the configured one is empty.
pub const DEFAULT_SEPARATOR: &str = ":";

/// Remaining time split into display units.
///
/// `minutes` and `seconds` are always `< 60`; `hours` is unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct TimeValue {
    /// Whole hours.
    pub hours: u64,
    /// Minutes within the hour.
    pub minutes: u64,
    /// Seconds within the minute.
    pub seconds: u64,
}

impl TimeValue {
    /// Decompose a whole-second duration.
    pub fn from_total_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    /// Recompose into whole seconds, saturating at `u64::MAX`.
    pub fn total_seconds(self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }

    fn units(self) -> [u64; 3] {
        [self.hours, self.minutes, self.seconds]
    }
}

/// How a single time unit is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitFormat {
    /// Shown unpadded from the highest non-zero unit downwards; hidden above it.
    #[default]
    Auto,
    /// Never shown.
    Hide,
    /// Always shown, unpadded.
    Show,
    /// Always shown, left-padded with `0` to width 2.
    TwoDigits,
}

/// Per-unit display policy for hours, minutes and seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct UnitPolicy {
    /// Hours unit.
    pub hours: UnitFormat,
    /// Minutes unit.
    pub minutes: UnitFormat,
    /// Seconds unit.
    pub seconds: UnitFormat,
}

impl UnitPolicy {
    /// Same format for every unit.
    pub fn uniform(format: UnitFormat) -> Self {
        Self {
            hours: format,
            minutes: format,
            seconds: format,
        }
    }

    fn units(self) -> [UnitFormat; 3] {
        [self.hours, self.minutes, self.seconds]
    }
}

/// Top-level text mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatMode {
    /// Unit tokens joined by the separator.
    #[default]
    Classic,
    /// Total remaining seconds as a plain decimal number.
    PureNumber,
}

/// Format a time value under `policy`, joining emitted unit tokens with `separator`.
///
/// Units are evaluated in hours, minutes, seconds order. Under [`UnitFormat::Auto`] a unit is
/// emitted unpadded when it is at or below the highest non-zero unit (`65s` renders `1:5`), or as `0` when
/// everything is zero and it is the last unit. Suppressed units contribute neither a token nor a
/// separator. An empty separator falls back to [`DEFAULT_SEPARATOR`].
pub fn format_countdown(time: TimeValue, policy: UnitPolicy, separator: &str) -> String {
    let values = time.units();
    let formats = policy.units();
    let highest_non_zero = values.iter().position(|&v| v > 0);
    let last = values.len() - 1;

    let mut tokens = Vec::with_capacity(values.len());
    for (idx, (&value, &format)) in values.iter().zip(formats.iter()).enumerate() {
        let token = match format {
            UnitFormat::Hide => None,
            UnitFormat::Show => Some(value.to_string()),
            UnitFormat::TwoDigits => Some(format!("{value:02}")),
            UnitFormat::Auto => match highest_non_zero {
                None if idx == last => Some("0".to_owned()),
                None => None,
                Some(h) if idx >= h => Some(value.to_string()),
                Some(_) => None,
            },
        };
        tokens.extend(token);
    }

    let separator = if separator.is_empty() {
        DEFAULT_SEPARATOR
    } else {
        separator
    };
    tokens.join(separator)
}

/// Display string for `remaining_secs` under the text settings of `config`.
pub fn display_text(config: &VisualConfig, remaining_secs: u64) -> String {
    match config.format_mode {
        FormatMode::PureNumber => remaining_secs.to_string(),
        FormatMode::Classic => format_countdown(
            TimeValue::from_total_seconds(remaining_secs),
            config.unit_policy(),
            &config.separator,
        ),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/format.rs"]
mod tests;
