pub mod health;
pub mod stocks;
pub mod functions;
