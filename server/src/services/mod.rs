pub mod player_cache_evictor;
pub mod sheet_sync;
