pub mod job_description;
pub mod resume_parse;

pub use job_description::JobDescriptionTask;
pub use resume_parse::ResumeParseTask;
