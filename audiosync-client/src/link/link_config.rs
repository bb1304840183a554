use audiosync_core::utils::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};

#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub ice_servers: Vec<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()],
        }
    }
}
