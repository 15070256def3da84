pub mod slug;
pub mod types;
pub mod utils;
