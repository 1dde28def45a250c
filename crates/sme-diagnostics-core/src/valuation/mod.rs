pub mod business_value;
