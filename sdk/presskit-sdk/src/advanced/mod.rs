pub mod batch;
pub mod poller;
