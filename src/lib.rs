pub mod api_client;
pub mod day_report;
pub mod fake_feed;
pub mod fixture;
pub mod fixture_source;
pub mod form_stats;
pub mod head_to_head;
pub mod http_client;
pub mod obvious;
pub mod projection;
pub mod projection_store;
pub mod render;
pub mod ttl_cache;
