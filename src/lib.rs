pub mod config;
pub mod demo;
pub mod export;
pub mod feed;
pub mod game_stats;
pub mod http_client;
pub mod import_service;
pub mod player_profile;
pub mod query_filter;
pub mod roster;
pub mod roster_store;
pub mod state;
pub mod summary;
pub mod wiki_client;
