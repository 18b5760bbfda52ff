mod banyan;
mod icc;
mod store;
mod utils;
