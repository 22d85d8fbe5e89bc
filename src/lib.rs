pub mod capabilities;
pub mod cli;
pub mod controller;
pub mod gpx;
pub mod kv;
pub mod store;
pub mod terminal;
pub mod types;
pub mod utils;
pub mod validation;
