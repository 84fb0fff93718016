//! SeaORM entities for the `campaigns` and `campaign_sends` tables

pub mod campaign;
pub mod send;
