pub mod errors;
pub mod db;
pub mod html;
pub mod banner;
