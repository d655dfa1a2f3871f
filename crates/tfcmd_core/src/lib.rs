//! # tfcmd_core
//!
//! Option resolution and command-line assembly for terraform invocations.
//!
//! Callers name a command, hand in a map of values, and get back a
//! [`CommandLine`] ready for an executor. Nothing here spawns processes.
//!
//! ## Flow
//!
//! - [`catalog`] says which switches and arguments a command accepts
//! - [`Definitions`] says how each switch reads its value (kind, keys, repeatability)
//! - [`OptionsFactory`] turns values into ordered [`CliOption`]s
//! - [`CommandLineBuilder`] renders subcommands, options and arguments
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use tfcmd_core::{catalog, Definitions, OptionValue, OptionValues};
//!
//! let values = OptionValues::new()
//!     .set("auto_approve", true)
//!     .set("vars", OptionValue::from(json!({"first": 1, "second": "two"})))
//!     .set("plan", "some/path");
//!
//! let line = catalog::lookup("apply")?
//!     .build("terraform", &values, Definitions::builtin())?;
//!
//! assert_eq!(
//!     line.to_string(),
//!     "terraform apply -auto-approve=true -var 'first=1' -var 'second=two' some/path"
//! );
//! # Ok::<(), tfcmd_core::OptionError>(())
//! ```

pub mod builder;
pub mod catalog;
pub mod coerce;
pub mod definition;
pub mod definitions;
pub mod error;
pub mod factory;
pub mod option;
pub mod switch;
pub mod value;

pub use builder::{CommandLine, CommandLineBuilder, IntoTokens, RenderedOption, DEFAULT_SEPARATOR};
pub use catalog::CommandSpec;
pub use coerce::coerce_boolean;
pub use definition::{Definition, DefinitionSpec, ExtraKeys, KeyOverride, OverrideKeys, ValueKind};
pub use definitions::Definitions;
pub use error::{OptionError, OptionResult};
pub use factory::OptionsFactory;
pub use option::{CliOption, OptionKind, OptionPayload, Placement};
pub use switch::Switch;
pub use value::{OptionValue, OptionValues, Scalar};
