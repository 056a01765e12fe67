
// imports
use crate::aggregate::{Aggregate, AverageMode};
use crate::corpus::{KeywordCorpus, KeywordCorpusBuilder, Sentence};
use crate::error::Sec2VecError;
use crate::vectors::TokenVectors;

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

use log::info;
use ndarray::{Array1, ArrayView1};


// the seam to the external embedding-training library. implementations own
// their hyperparameters and produce the token-to-vector lookup; nothing about
// the training algorithm leaks into this crate.
pub trait Embedder {

    // feed a token stream into vocabulary building. `update` extends the
    // existing vocabulary instead of replacing it.
    fn build_vocab(&mut self, tokens: &mut dyn Iterator<Item = &str>, update: bool) -> Result<(), Box<dyn Error>>;

    fn train(&mut self, sentences: &[Sentence], update: bool, callbacks: &[&dyn TrainCallback]) -> Result<(), Box<dyn Error>>;

    fn vectors(&self) -> &TokenVectors;
}


// observer injected by the caller, replacing any process-wide logging hook.
// trainers are expected to fire the epoch events, the model fires the rest.
pub trait TrainCallback: Sync {
    fn on_train_begin(&self) {}
    fn on_epoch_begin(&self, _epoch: usize) {}
    fn on_epoch_end(&self, _epoch: usize) {}
    fn on_train_end(&self) {}
}

pub struct EpochLogger {}

impl TrainCallback for EpochLogger {

    fn on_train_begin(&self) {
        info!("training started");
    }

    fn on_epoch_begin(&self, epoch: usize) {
        info!("epoch {} started", epoch);
    }

    fn on_epoch_end(&self, epoch: usize) {
        info!("epoch {} finished", epoch);
    }

    fn on_train_end(&self) {
        info!("training finished");
    }

}


// hyperparameters handed through to a skip-gram/CBOW style trainer, not
// validated here. defaults follow the common word2vec conventions.
#[derive(Clone, Debug)]
pub struct SkipGramParams {
    pub size: usize,
    pub alpha: f32,
    pub window: usize,
    pub min_count: usize,
    pub max_vocab_size: Option<usize>,
    pub sample: f32,
    pub seed: u64,
    pub workers: usize,
    pub min_alpha: f32,
    pub sg: bool,
    pub hs: bool,
    pub negative: usize,
    pub ns_exponent: f32,
    pub cbow_mean: bool,
    pub epochs: usize,
    pub batch_words: usize,
    pub compute_loss: bool,
}

impl Default for SkipGramParams {
    fn default() -> Self {
        Self {
            size: 100,
            alpha: 0.025,
            window: 5,
            min_count: 5,
            max_vocab_size: None,
            sample: 0.001,
            seed: 1,
            workers: 3,
            min_alpha: 0.0001,
            sg: false,
            hs: false,
            negative: 5,
            ns_exponent: 0.75,
            cbow_mean: true,
            epochs: 5,
            batch_words: 10000,
            compute_loss: false,
        }
    }
}

impl Display for SkipGramParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "trainer hyper parameters:
        size: {},
        alpha: {},
        window: {},
        min_count: {},
        epochs: {},
        sg: {},
        hs: {},
        negative: {}",
        self.size, self.alpha, self.window, self.min_count, self.epochs, self.sg, self.hs, self.negative
        )
    }
}

// the subword-augmented variant: the skip-gram parameters plus character
// n-gram settings
#[derive(Clone, Debug)]
pub struct SubwordParams {
    pub base: SkipGramParams,
    pub min_n: usize,
    pub max_n: usize,
    pub bucket: usize,
    pub word_ngrams: usize,
}

impl Default for SubwordParams {
    fn default() -> Self {
        Self {
            base: SkipGramParams::default(),
            min_n: 3,
            max_n: 6,
            bucket: 2_000_000,
            word_ngrams: 1,
        }
    }
}

impl Display for SubwordParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},
        min_n: {},
        max_n: {},
        bucket: {}",
        self.base, self.min_n, self.max_n, self.bucket
        )
    }
}


// composes the keyword corpus with an external trainer (has-a, no
// inheritance): builds the corpus on construction, feeds the flattened token
// stream to vocabulary building, and refreshes the keyword vector map after
// every training call.
pub struct KeywordModel<E: Embedder> {
    kc: KeywordCorpus,
    kv: HashMap<String, Array1<f32>>,
    embedder: E,
    mode: AverageMode,
}

impl<E: Embedder> KeywordModel<E> {

    pub fn new(
        keywords: &[String],
        sentences: &[Sentence],
        chunk_size: usize,
        workers: usize,
        case_sensitive: bool,
        mode: AverageMode,
        mut embedder: E,
    ) -> Result<KeywordModel<E>, Box<dyn Error>> {

        let builder = KeywordCorpusBuilder::new(keywords, case_sensitive)?;
        let kc = builder.create(sentences, chunk_size, workers)?;
        embedder.build_vocab(&mut kc.iter_tokens(), false)?;

        Ok(Self { kc, kv: HashMap::new(), embedder, mode })
    }

    // trains the external model and refreshes the keyword vector map. update
    // mode extends the vocabulary with the given sentences and trains on them,
    // default mode retrains on the flattened keyword corpus. a fresh call
    // overwrites prior vectors for every keyword present in the corpus.
    pub fn train_embed(
        &mut self,
        sentences: Option<&[Sentence]>,
        update: bool,
        callbacks: &[&dyn TrainCallback],
    ) -> Result<(), Box<dyn Error>> {

        for callback in callbacks {
            callback.on_train_begin();
        }

        if update {
            let new_sentences = sentences.ok_or(Sec2VecError::UpdateWithoutSentences)?;
            let mut tokens = new_sentences
                .iter()
                .flat_map(|sentence| sentence.iter().map(String::as_str));
            self.embedder.build_vocab(&mut tokens, true)?;
            self.embedder.train(new_sentences, true, callbacks)?;
        } else {
            let corpus_sentences: Vec<Sentence> = self.kc.iter_sentences().cloned().collect();
            self.embedder.train(&corpus_sentences, false, callbacks)?;
        }

        for callback in callbacks {
            callback.on_train_end();
        }

        self.kv = Aggregate::run(&self.kc, self.embedder.vectors(), self.mode)?;
        Ok(())
    }

    pub fn corpus(&self) -> &KeywordCorpus {
        &self.kc
    }

    pub fn keyword_vectors(&self) -> &HashMap<String, Array1<f32>> {
        &self.kv
    }

    // None until train_embed has run, or for a keyword with no sentences
    pub fn keyword_vector(&self, keyword: &str) -> Option<&Array1<f32>> {
        self.kv.get(keyword)
    }

    pub fn token_vector(&self, token: &str) -> Option<ArrayView1<f32>> {
        self.embedder.vectors().get(token)
    }

}
