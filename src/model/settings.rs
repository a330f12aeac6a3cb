use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What [`SparseModel`](crate::model::SparseModel) does when an added row
/// or column carries a coefficient for a (row, column) pair that is
/// already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DuplicatePolicy {
    /// fail the whole add
    #[default]
    Reject,
    /// replace the stored value
    Overwrite,
    /// add to the stored value
    Sum,
}

/// Settings for a [`SparseModel`](crate::model::SparseModel).
///
/// Build with [`ModelSettingsBuilder`] or take the defaults:
///
/// ```no_run
/// use sparse_model::model::*;
///
/// let settings = ModelSettingsBuilder::default()
///     .initial_rows(100)
///     .duplicate_policy(DuplicatePolicy::Sum)
///     .build()
///     .unwrap();
/// ```

#[derive(Builder, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModelSettings {
    ///row capacity reserved up front
    #[builder(default = "0")]
    pub initial_rows: usize,

    ///column capacity reserved up front
    #[builder(default = "0")]
    pub initial_columns: usize,

    ///element capacity reserved up front
    #[builder(default = "0")]
    pub initial_elements: usize,

    ///carry edits into the second view by replaying chain positions
    ///(true) or through the pair hash (false)
    #[builder(default = "true")]
    pub propagate_positions: bool,

    ///handling of coefficients for pairs already stored
    #[builder(default = "DuplicatePolicy::Reject")]
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for ModelSettings {
    fn default() -> ModelSettings {
        ModelSettingsBuilder::default().build().unwrap()
    }
}

#[test]
fn test_settings_builder_defaults() {
    let built = ModelSettingsBuilder::default().build().unwrap();
    assert_eq!(built, ModelSettings::default());

    let built = ModelSettingsBuilder::default()
        .propagate_positions(false)
        .initial_elements(64)
        .build()
        .unwrap();
    assert!(!built.propagate_positions);
    assert_eq!(built.initial_elements, 64);
    assert_eq!(built.duplicate_policy, DuplicatePolicy::Reject);
}
