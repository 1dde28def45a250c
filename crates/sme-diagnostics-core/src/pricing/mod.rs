pub mod scenarios;
pub mod unit_cost;
