pub mod jwt;
pub mod one_time_token;
pub mod password;
