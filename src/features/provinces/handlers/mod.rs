mod province_handler;

pub use province_handler::*;
