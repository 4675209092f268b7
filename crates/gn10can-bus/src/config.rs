use serde::{Deserialize, Serialize};

/// What `attach` does when the key already has a live handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail with `BusError::DuplicateRegistration` and keep the existing handler.
    #[default]
    Reject,
    /// Install the new handler. The previous handle stops being attached.
    Replace,
}

/// Controls router behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Policy for attaching to an occupied key.
    pub duplicate_policy: DuplicatePolicy,
    /// Upper bound on frames drained by one `update` call. `None` or
    /// `Some(0)` drains until the driver reports no pending frame.
    pub max_frames_per_update: Option<usize>,
}

impl BusConfig {
    /// Effective per-pass frame limit. Zero counts as unbounded.
    pub fn frame_limit(&self) -> Option<usize> {
        self.max_frames_per_update.filter(|&limit| limit > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reject_duplicates_and_drain_fully() {
        let config = BusConfig::default();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.max_frames_per_update, None);
    }

    #[test]
    fn loads_partial_json() {
        let config: BusConfig =
            serde_json::from_str(r#"{ "duplicate_policy": "replace" }"#).unwrap();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Replace);
        assert_eq!(config.max_frames_per_update, None);

        let config: BusConfig = serde_json::from_str(r#"{ "max_frames_per_update": 32 }"#).unwrap();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.max_frames_per_update, Some(32));
    }

    #[test]
    fn zero_frame_limit_means_unbounded() {
        let config: BusConfig = serde_json::from_str(r#"{ "max_frames_per_update": 0 }"#).unwrap();
        assert_eq!(config.frame_limit(), None);

        let config: BusConfig = serde_json::from_str(r#"{ "max_frames_per_update": 4 }"#).unwrap();
        assert_eq!(config.frame_limit(), Some(4));
        assert_eq!(BusConfig::default().frame_limit(), None);
    }
}
