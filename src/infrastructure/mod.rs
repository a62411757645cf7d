pub mod db;
pub mod transcode;
