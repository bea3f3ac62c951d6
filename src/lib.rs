pub mod api;
pub mod wol;
