//! Structured model of terraform JSON plans.
//!
//! [`Plan`] destructures the output of `terraform show -json <planfile>` into
//! resource and output changes. Each [`Change`] is classified by its action
//! sequence and exposes its before and after states as [`BoxedValue`] trees
//! that record, at every level, whether a value is known, unknown until
//! apply, or sensitive.
//!
//! ```
//! use tfcmd_plan::Plan;
//!
//! let plan = Plan::parse(r#"{
//!     "format_version": "1.2",
//!     "resource_changes": [{
//!         "address": "aws_instance.web",
//!         "type": "aws_instance",
//!         "name": "web",
//!         "change": {"actions": ["delete", "create"]}
//!     }]
//! }"#).unwrap();
//!
//! let web = plan.resource_change_with_address("aws_instance.web").unwrap();
//! assert!(web.is_replace_delete_before_create());
//! assert_eq!(plan.summary().to_replace, 1);
//! ```

pub mod boxing;
pub mod change;
pub mod error;
mod hashing;
pub mod path;
pub mod plan;
pub mod resource_change;
pub mod values;

pub use boxing::box_value;
pub use change::{Action, Change, ChangeKind};
pub use error::{PlanError, PlanResult};
pub use path::{leaf_paths, Path, PathSegment};
pub use plan::{Plan, PlanSummary, Variable};
pub use resource_change::{OutputChange, ResourceChange, ResourceFilter, ResourceMode};
pub use values::{BoxedValue, OMITTED_PLACEHOLDER, SENSITIVE_PLACEHOLDER, UNKNOWN_PLACEHOLDER};
