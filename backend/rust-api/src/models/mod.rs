pub mod audit;
pub mod block;
pub mod capabilities;
pub mod history;
pub mod mastery;
pub mod policy;
pub mod scoring;
