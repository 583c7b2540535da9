//! Lambda functions behind the meeting summarizer pipeline.
//!
//! Each binary under `src/bin` wires one handler from this library to the
//! Lambda runtime:
//!
//! * `assume_role` - [`credentials`]: temporary credentials for the frontend.
//! * `provision_project` - [`project`]: CloudFormation custom resource for the
//!   data automation project.
//! * `start_automation_job` - [`automation_job`]: video analysis jobs.
//! * `start_transcription_job` - [`transcription`]: Transcribe jobs on upload.
//! * `generate_summary` - [`summary`]: meeting minutes from analysis output.
//!
//! Handlers are generic over small service traits and always return a
//! response value, so business failures never surface as Lambda errors.

pub mod automation_job;
pub mod aws;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod project;
pub mod response;
pub mod s3_querier;
pub mod summary;
pub mod transcription;
pub mod utilities;

pub use error::{Error, Result};
pub use response::HttpResponse;
