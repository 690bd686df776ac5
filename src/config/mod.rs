pub mod pipeline;

pub use pipeline::AppConfig;
