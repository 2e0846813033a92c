pub mod cover_letter;
pub mod job;
pub mod outreach;
pub mod resume;
pub mod spans;
pub mod user;
pub mod vocab;
