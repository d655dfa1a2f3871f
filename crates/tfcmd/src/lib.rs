//! # tfcmd
//!
//! Build, run and inspect terraform commands.
//!
//! [`Terraform`] ties the pieces together: it looks a command up in the
//! catalog, resolves user values into options, assembles the command line,
//! hands it to an executor and, for `show -json`, parses the resulting plan.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use tfcmd::{OptionValues, Terraform, TerraformConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TerraformConfig::from_file(Path::new("tfcmd.yaml"))?.with_env_overrides()?;
//!     let tf = Terraform::new(config)?;
//!
//!     tf.init(&OptionValues::new().set("input", false)).await?;
//!     tf.plan(&OptionValues::new().set("out", "tfplan")).await?;
//!
//!     let plan = tf.show_plan(Path::new("tfplan")).await?;
//!     println!("{}", plan.summary());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod terraform;

pub use config::TerraformConfig;
pub use error::{TfError, TfResult};
pub use terraform::{Terraform, TerraformOutput};

pub use tfcmd_core::{CommandLine, OptionValue, OptionValues};
pub use tfcmd_plan::Plan;
