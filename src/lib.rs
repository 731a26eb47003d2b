pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use io::{
    DeepgramConfig, DeepgramTranscriber, PolicyStore, TranscribeError, Transcriber,
    list_audio_files, retrieve_policies, validate_filename,
};
pub use llm::{AnthropicClient, AnthropicConfig, Generator, GeneratorError, build_prompt};
pub use models::{AnalysisRecord, AnalysisReport, RiskLevel, RiskVerdict, TenantConfig};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError};
pub use stages::{AnalysisError, Analyzer, band_for, normalize, score};
