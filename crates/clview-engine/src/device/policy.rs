use crate::compute::DeviceInfo;

/// Chooses one device out of the GPU devices of the selected platform.
///
/// Enumeration stays in [`select_device`](super::select_device); a policy
/// only sees the enumerated candidates, in driver order.
pub trait SelectionPolicy {
    /// Returns the index of the chosen candidate, or `None` if none is acceptable.
    fn choose(&self, candidates: &[DeviceInfo]) -> Option<usize>;
}

/// Picks the last enumerated device.
///
/// This is not a capability ranking. It reproduces the long-standing
/// behavior of overwriting a single slot while enumerating.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LastEnumerated;

impl SelectionPolicy for LastEnumerated {
    fn choose(&self, candidates: &[DeviceInfo]) -> Option<usize> {
        candidates.len().checked_sub(1)
    }
}

/// Picks the device at a fixed enumeration index.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ByIndex(pub usize);

impl SelectionPolicy for ByIndex {
    fn choose(&self, candidates: &[DeviceInfo]) -> Option<usize> {
        (self.0 < candidates.len()).then_some(self.0)
    }
}

/// Configuration-friendly form of the built-in policies.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum DevicePolicy {
    #[default]
    Last,
    Index(usize),
}

impl SelectionPolicy for DevicePolicy {
    fn choose(&self, candidates: &[DeviceInfo]) -> Option<usize> {
        match *self {
            DevicePolicy::Last => LastEnumerated.choose(candidates),
            DevicePolicy::Index(i) => ByIndex(i).choose(candidates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices(n: usize) -> Vec<DeviceInfo> {
        (0..n)
            .map(|i| DeviceInfo { name: format!("gpu{i}"), extensions: String::new() })
            .collect()
    }

    #[test]
    fn last_wins() {
        assert_eq!(LastEnumerated.choose(&devices(3)), Some(2));
        assert_eq!(LastEnumerated.choose(&devices(1)), Some(0));
    }

    #[test]
    fn last_on_empty_is_none() {
        assert_eq!(LastEnumerated.choose(&[]), None);
    }

    #[test]
    fn by_index_in_and_out_of_range() {
        assert_eq!(ByIndex(1).choose(&devices(3)), Some(1));
        assert_eq!(ByIndex(3).choose(&devices(3)), None);
    }

    #[test]
    fn default_policy_is_last() {
        assert_eq!(DevicePolicy::default().choose(&devices(4)), Some(3));
        assert_eq!(DevicePolicy::Index(0).choose(&devices(4)), Some(0));
    }
}
