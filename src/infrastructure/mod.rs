pub mod session_host;
