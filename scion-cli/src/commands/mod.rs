pub mod changes;
pub mod pull;
pub mod push;
pub mod repos;
pub mod review;
pub mod violations;
