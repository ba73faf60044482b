//! # Elicit — expert uncertainty elicitation engine
//!
//! An expert describes, for each scenario, an uncertain outcome under two
//! arms: a **baseline** and a **treatment** (an intervention). Each arm is a
//! bounded unimodal distribution given by `(min, max, mode, confidence)` and
//! rendered as a scaled Beta density on `[min, max]`.
//!
//! ## Pipeline
//!
//! | Stage | Module | Description |
//! |-------|--------|-------------|
//! | Shape | [`shape`] | `(mode, confidence)` → Beta `(α, β)` with concentration `κ = 4 + (c/100)·20` |
//! | Density | [`density`] | Log-space sampling of 101 `(x, y)` points, curve summary |
//! | Storage | [`sparse`] | Unset-or-edited fields; realize against defaults, reduce back |
//! | Edits | [`constraints`] | Clamp, cascade and write back so ordering and dominance always hold |
//! | Files | [`session`] | Host session state and the comma-separated session file |
//! | Outputs | [`impact`], [`report`] | Expected outcomes, yield impact, parallel batch report |
//!
//! ## Invariants
//!
//! After every edit, on realized values:
//! - `0 ≤ min ≤ mode ≤ max ≤ 100` and `1 ≤ confidence ≤ 100` in each arm
//! - `treatment.f ≤ baseline.f` for `f ∈ {min, mode, max}`
//!
//! Sparse storage keeps a field unset until the expert moves it off its default.

pub mod constants;
pub mod constraints;
pub mod density;
pub mod env_config;
pub mod error;
pub mod impact;
pub mod report;
pub mod session;
pub mod shape;
pub mod sparse;
pub mod types;

pub use constraints::{apply_edit, Edit};
pub use density::{sample_density, DensityPoint};
pub use error::{CodecError, ErrorKind, SessionError};
pub use session::Session;
pub use shape::map_to_shape_parameters;
pub use types::{
    Arm, BetaParams, Distribution, Field, Scenario, ScenarioDistribution, SparseDistribution,
    SparseScenarioDistribution,
};
