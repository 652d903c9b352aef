pub mod flag;
pub mod health;
pub mod serve;
