pub mod file_list;
pub mod handlers;
pub mod header;
pub mod results;
pub mod submit_section;
pub mod upload_section;
pub mod utils;
