pub mod api;
pub mod database_ops;
pub mod normalization;
pub mod settings;
pub mod tracing;

pub mod util {
    pub mod db;
    pub mod env;
}

#[cfg(test)]
mod test_support;
