pub mod download;
pub mod features;
pub mod lookup;
pub mod pipeline;

pub use download::run_download;
pub use features::run_features;
pub use lookup::run_lookup;
pub use pipeline::run_pipeline;
