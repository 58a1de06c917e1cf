//! Default value functions shared by the config types.

pub fn default_port() -> u16 {
    3544
}

pub fn default_ping_timeout() -> u64 {
    30
}

pub fn default_sweep_interval() -> u64 {
    60
}

pub fn default_max_message_size() -> usize {
    16384 // 16KB; the largest legitimate frame is a fetch_details response
}

pub fn default_cors_origins() -> String {
    "*".to_string()
}

pub fn default_queue_capacity() -> usize {
    64
}

pub fn default_connect_timeout_secs() -> u64 {
    10
}

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "server.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub fn default_enable_file_logging() -> bool {
    false
}

pub fn default_log_format() -> super::logging::LogFormat {
    super::logging::LogFormat::Text
}
