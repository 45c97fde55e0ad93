pub mod campaign_type;
