//! Campus Locator Common Library
//!
//! CLIと将来のモバイル/Webフロントエンドで共有される型・ワークフロー中核

pub mod types;
pub mod error;
pub mod parser;
pub mod multipart;
pub mod viewport;
pub mod landmarks;
pub mod scene;
pub mod workflow;

pub use types::{Coordinate, DetectionResult, PhotoDescriptor, UserPosition, FALLBACK_POSITION};
pub use error::{Capability, Error, Notification, Result};
pub use parser::{derive_upload_filename, parse_detection_response};
pub use multipart::{FormPart, MultipartBody, MultipartBuilder};
pub use viewport::{compute_region, MapRegion, MIN_DELTA, SPAN_FACTOR};
pub use landmarks::{find_landmark, Landmark, CAMPUS_LANDMARKS, CAMPUS_TITLE};
pub use scene::{InfoCard, MapScene, Marker, PinColor};
pub use workflow::{Completion, Screen, SubmissionTicket, Transition, Workflow, WorkflowState};
