pub mod forecast_store;
