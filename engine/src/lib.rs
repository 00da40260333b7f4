pub mod account;
pub mod accrual;
pub mod arcade;
pub mod clock;
pub mod constants;
pub mod mining;
pub mod spawner;
pub mod store;
pub mod types;
