
mod aggregate;
mod config;
mod corpus;
mod error;
mod model;
mod pipeline;
mod vectors;

pub use aggregate::{Aggregate, AverageMode};
pub use config::{files_handling, Config};
pub use corpus::{KeywordCorpus, KeywordCorpusBuilder, Sentence, SentenceLoader};
pub use error::Sec2VecError;
pub use model::{Embedder, EpochLogger, KeywordModel, SkipGramParams, SubwordParams, TrainCallback};
pub use pipeline::Pipeline;
pub use vectors::TokenVectors;
