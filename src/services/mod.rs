pub mod admin;
pub mod submission;
pub mod topic;

pub use admin::AdminService;
pub use submission::{
    SubmissionClient, SubmissionReceipt, SubmissionRequest, SubmissionService, SubmitFailure, Upload,
};
pub use topic::TopicFilter;
