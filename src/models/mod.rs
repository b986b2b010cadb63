pub mod job_advert;
pub mod job_application;
pub mod pending_user;
pub mod token;
pub mod user;
