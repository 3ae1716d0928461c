
mod review;
mod workflow;
