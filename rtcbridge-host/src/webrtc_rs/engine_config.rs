/// Threads backing the engine runtime.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub worker_threads: usize,
    pub thread_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: 2,
            thread_name: "rtc-engine".to_owned(),
        }
    }
}
