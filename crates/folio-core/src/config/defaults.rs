//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Folio".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_poll_timeout() -> u64 {
    30
}

pub fn default_cn_bundle() -> String {
    "langs/cn.json".to_string()
}

pub fn default_en_bundle() -> String {
    "langs/en.json".to_string()
}

pub fn default_worker_idle() -> u64 {
    600
}
