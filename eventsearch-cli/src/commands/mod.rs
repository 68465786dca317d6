pub mod check;
pub mod search;
