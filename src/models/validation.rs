//! Field checks shared by [`Rocket`](super::Rocket) and [`RocketDraft`](super::RocketDraft).

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ModelError, ModelResult};

/// An unsigned decimal quantity with an optional unit suffix, e.g. `22800`,
/// `22,800`, `8300 kg` or `13.6t`. Digits, units and padding are ASCII only.
static MASS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t\r\n]*(?:[0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)(?:\.[0-9]+)?(?:[ \t]*[A-Za-z]+)?[ \t\r\n]*$")
        .expect("mass pattern compiles")
});

/// Rejects empty and whitespace-only strings.
pub fn check_not_blank(field: &'static str, value: &str) -> ModelResult<()> {
    if value.trim().is_empty() {
        return Err(ModelError::invalid(field, "cannot be null or empty"));
    }
    Ok(())
}

/// Returns true if `value` reads as a payload mass.
pub fn is_mass_format(value: &str) -> bool {
    MASS_REGEX.is_match(value)
}

/// Full check applied by every `set_mass_to_*` setter.
pub fn check_mass(field: &'static str, value: &str) -> ModelResult<()> {
    check_not_blank(field, value)?;
    if !is_mass_format(value) {
        return Err(ModelError::invalid(
            field,
            format!("'{}' is not a numeric quantity", value),
        ));
    }
    Ok(())
}
