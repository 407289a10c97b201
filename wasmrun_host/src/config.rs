use crate::DEFAULT_MAX_MEMORY;

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) fuel: Option<u64>,
    pub(crate) max_memory: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            fuel: None,
            max_memory: DEFAULT_MAX_MEMORY,
        }
    }
}

impl Config {
    pub fn fuel(&self) -> Option<u64> {
        self.fuel
    }

    pub fn max_memory(&self) -> usize {
        self.max_memory
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Enable fuel metering. Every invocation starts with `limit` units of fuel.
    pub fn fuel(mut self, limit: u64) -> Self {
        self.config.fuel = Some(limit);
        self
    }

    /// Upper bound in bytes for the linear memory of an instance.
    pub fn max_memory(mut self, size: usize) -> Self {
        self.config.max_memory = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl From<ConfigBuilder> for Config {
    fn from(builder: ConfigBuilder) -> Self {
        builder.build()
    }
}
