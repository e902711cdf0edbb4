/// Requested purchase quantity.
///
/// `None` is the unset marker: the user cleared the field and is mid-edit.
/// It is distinct from an explicit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseCounter {
    value: Option<u64>,
}

impl Default for PurchaseCounter {
    fn default() -> Self {
        Self { value: Some(1) }
    }
}

impl PurchaseCounter {
    pub fn unset() -> Self {
        Self { value: None }
    }

    pub fn value(&self) -> Option<u64> {
        self.value
    }

    pub fn is_unset(&self) -> bool {
        self.value.is_none()
    }

    /// Units a purchase of this counter buys. Unset and 0 both mean one.
    pub fn units_to_purchase(&self) -> u64 {
        match self.value {
            Some(count) if count > 0 => count,
            _ => 1,
        }
    }

    /// Apply a requested value against `available` units.
    pub fn set(&mut self, requested: Option<i64>, available: u64) {
        *self = set_counter(requested, available);
    }

    /// Apply text typed into the quantity field. Non-numeric text leaves the
    /// counter untouched.
    pub fn set_from_text(&mut self, text: &str, available: u64) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.value = None;
            return;
        }
        match trimmed.parse::<i64>() {
            Ok(requested) => self.set(Some(requested), available),
            Err(err) => tracing::debug!("ignoring counter input {trimmed:?}: {err}"),
        }
    }

    pub fn decrement(&mut self, available: u64) {
        let base = as_request(self.value.unwrap_or(1));
        self.set(Some(base.saturating_sub(1)), available);
    }

    pub fn increment(&mut self, available: u64) {
        let base = as_request(self.value.unwrap_or(1));
        self.set(Some(base.saturating_add(1)), available);
    }

    /// Re-apply the bounds after `available` changed. Unset stays unset and
    /// a zero counter returns to one once units are available again.
    pub fn resync(&mut self, available: u64) {
        if let Some(value) = self.value {
            self.set(Some(as_request(value.max(1))), available);
        }
    }

    pub fn can_decrement(&self) -> bool {
        !matches!(self.value, Some(count) if count <= 1)
    }

    pub fn can_increment(&self, available: u64) -> bool {
        !matches!(self.value, Some(count) if count >= available)
    }
}

/// Saturating `u64 -> i64` for values fed back into `set_counter`.
pub fn as_request(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Clamp a requested quantity into `[0, available]`.
///
/// * `None` -> unset marker
/// * `0 < v <= available` -> `v`
/// * `v > available` -> `available`
/// * `v < 1` -> 0
pub fn set_counter(requested: Option<i64>, available: u64) -> PurchaseCounter {
    let value = match requested {
        None => None,
        Some(v) if v < 1 => Some(0),
        Some(v) if (v as u64) <= available => Some(v as u64),
        Some(_) => Some(available),
    };
    PurchaseCounter { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_unset_for_any_availability() {
        for available in [0, 1, 3, 100] {
            assert!(set_counter(None, available).is_unset());
        }
    }

    #[test]
    fn result_never_leaves_bounds() {
        for available in 0..6u64 {
            for requested in -5..12i64 {
                let value = set_counter(Some(requested), available)
                    .value()
                    .expect("numeric input is never unset");
                assert!(value <= available, "{requested} / {available} -> {value}");
            }
        }
    }

    #[test]
    fn clamps_to_available() {
        assert_eq!(set_counter(Some(5), 3).value(), Some(3));
        assert_eq!(set_counter(Some(2), 3).value(), Some(2));
        assert_eq!(set_counter(Some(0), 3).value(), Some(0));
        assert_eq!(set_counter(Some(-4), 3).value(), Some(0));
    }

    #[test]
    fn increment_and_decrement_use_one_as_base_when_unset() {
        let mut counter = PurchaseCounter::unset();
        counter.increment(5);
        assert_eq!(counter.value(), Some(2));

        let mut counter = PurchaseCounter::unset();
        counter.decrement(5);
        assert_eq!(counter.value(), Some(0));
    }

    #[test]
    fn increment_stops_at_available() {
        let mut counter = set_counter(Some(3), 3);
        counter.increment(3);
        assert_eq!(counter.value(), Some(3));
        assert!(!counter.can_increment(3));
    }

    #[test]
    fn disabled_controls_are_derived() {
        let counter = set_counter(Some(1), 4);
        assert!(!counter.can_decrement());
        assert!(counter.can_increment(4));

        let unset = PurchaseCounter::unset();
        assert!(unset.can_decrement());
        assert!(unset.can_increment(0));
    }

    #[test]
    fn text_input() {
        let mut counter = PurchaseCounter::default();
        counter.set_from_text("  ", 4);
        assert!(counter.is_unset());

        counter.set_from_text("7", 4);
        assert_eq!(counter.value(), Some(4));

        counter.set_from_text("abc", 4);
        assert_eq!(counter.value(), Some(4));
    }

    #[test]
    fn resync_follows_availability() {
        let mut counter = set_counter(Some(3), 3);
        counter.resync(1);
        assert_eq!(counter.value(), Some(1));

        counter.resync(0);
        assert_eq!(counter.value(), Some(0));

        counter.resync(4);
        assert_eq!(counter.value(), Some(1));

        let mut unset = PurchaseCounter::unset();
        unset.resync(2);
        assert!(unset.is_unset());
    }

    #[test]
    fn huge_values_saturate_instead_of_wrapping() {
        let mut counter = set_counter(Some(i64::MAX), u64::MAX);
        counter.resync(u64::MAX);
        assert_eq!(counter.value(), Some(i64::MAX as u64));

        counter.increment(u64::MAX);
        assert_eq!(counter.value(), Some(i64::MAX as u64));
        assert_eq!(as_request(u64::MAX), i64::MAX);
    }

    #[test]
    fn units_to_purchase_treats_zero_and_unset_as_one() {
        assert_eq!(PurchaseCounter::unset().units_to_purchase(), 1);
        assert_eq!(set_counter(Some(0), 3).units_to_purchase(), 1);
        assert_eq!(set_counter(Some(3), 3).units_to_purchase(), 3);
    }
}
