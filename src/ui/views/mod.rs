pub mod check;
pub mod update;
