pub mod merge;
pub mod models;
pub mod normalizer;
pub mod one_way;
pub mod pairing;
pub mod pipeline;
pub mod ranking;

pub use merge::merge;
pub use models::RankedResult;
pub use normalizer::Normalizer;
pub use one_way::select_top_one_way;
pub use pairing::pair;
pub use pipeline::{run_pipeline, run_pipeline_concurrent, AwardPipeline};
pub use ranking::{rank_order, select_top_n};
