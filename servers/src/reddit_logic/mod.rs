pub mod config;
pub mod logger;
pub mod state;
pub mod session;
pub mod downstream;
pub mod routes;

#[cfg(test)]
pub mod testing;
