use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Per-field update policy for partial state updates.
///
/// `Keep` means "this update does not touch the field"; `Set` carries the new
/// value, which may itself be a falsy value such as `false`, `0` or `None`.
///
/// With serde, a missing field deserializes to `Keep` (use `#[serde(default)]`)
/// and any present value, `null` included, to `Set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Patch<T> {
    Keep,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<T> Patch<T> {
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Writes the value into `target` when set. Returns whether `target` changed.
    pub fn apply_to(self, target: &mut T) -> bool
    where
        T: PartialEq,
    {
        match self {
            Self::Set(value) if *target != value => {
                *target = value;
                true
            },
            _ => false,
        }
    }

    #[must_use]
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Keep => None,
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => value.serialize(serializer),
            Self::Keep => serializer.serialize_unit(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::Set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_leaves_target_alone() {
        let mut flag = true;
        assert!(!Patch::Keep.apply_to(&mut flag));
        assert!(flag);
    }

    #[test]
    fn set_writes_falsy_values() {
        let mut flag = true;
        assert!(Patch::Set(false).apply_to(&mut flag));
        assert!(!flag);

        let mut step = Some(5);
        assert!(Patch::Set(Some(0)).apply_to(&mut step));
        assert_eq!(step, Some(0));
        assert!(Patch::Set(None).apply_to(&mut step));
        assert_eq!(step, None);
    }

    #[test]
    fn setting_same_value_reports_no_change() {
        let mut step = Some(3);
        assert!(!Patch::Set(Some(3)).apply_to(&mut step));
    }
}
