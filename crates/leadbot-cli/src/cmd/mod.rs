pub mod config;
pub mod init;
pub mod leads;
pub mod serve;
