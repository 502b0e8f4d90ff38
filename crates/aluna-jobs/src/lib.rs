//! Scraping-job tracking for the Aluna client.
//!
//! A registered company's data is prepared by a long-running backend job.
//! This crate submits the registration form and then polls the job's status
//! at a fixed interval until it reaches a terminal state, handing off to the
//! conversational flow through a one-time completion callback.

pub mod poller;
pub mod register;

pub use poller::{JobHandle, JobPhase, JobPoller};
pub use register::register_company;
