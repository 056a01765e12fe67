
// imports
use crate::corpus::KeywordCorpus;
use crate::error::Sec2VecError;
use crate::vectors::TokenVectors;

use std::collections::HashMap;

use log::debug;
use ndarray::{Array1, ArrayView1};
use rayon::prelude::*;


// which divisor closes the per-keyword average.
//
// `AllTokens` divides the running sum by the total number of tokens summed over
// all of a keyword's sentences, and is the default. `FinalSentence` divides by
// the token count of the last sentence only, reproducing the behavior of the
// system this crate replaces for callers that depend on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AverageMode {
    AllTokens,
    FinalSentence,
}

impl Default for AverageMode {
    fn default() -> Self {
        AverageMode::AllTokens
    }
}


pub struct Aggregate {}

impl Aggregate {

    // sums token vectors over every sentence of one keyword, in stored order.
    // tokens absent from the lookup fall back to the unknown row. returns the
    // sum together with the divisor the configured mode asks for.
    fn reduce_keyword<'a>(
        sentences: &[Vec<String>],
        vectors: &'a TokenVectors,
        unk: ArrayView1<'a, f32>,
        mode: AverageMode,
    ) -> (Array1<f32>, usize) {

        let mut sum: Array1<f32> = Array1::zeros(vectors.dim());
        let mut total_tokens = 0;
        let mut last_len = 0;

        for sentence in sentences {
            for token in sentence {
                sum += &vectors.get(token).unwrap_or(unk);
            }
            total_tokens += sentence.len();
            last_len = sentence.len();
        }

        let divisor = match mode {
            AverageMode::AllTokens => total_tokens,
            AverageMode::FinalSentence => last_len,
        };

        (sum, divisor)
    }

    // computes one vector per keyword with at least one associated sentence.
    // keywords own independent accumulators, so the reduction runs in parallel.
    // keywords with no sentences produce no entry.
    pub fn run(
        corpus: &KeywordCorpus,
        vectors: &TokenVectors,
        mode: AverageMode,
    ) -> Result<HashMap<String, Array1<f32>>, Sec2VecError> {

        // fail early if the fallback row is missing from the lookup
        let unk = vectors.unknown_row()?;

        let kv: HashMap<String, Array1<f32>> = corpus
            .keywords()
            .par_iter()
            .filter_map(|keyword| {
                let sentences = corpus.get(keyword)?;
                if sentences.is_empty() {
                    return None;
                }
                let (sum, divisor) = Aggregate::reduce_keyword(sentences, vectors, unk, mode);
                Some((keyword.to_owned(), sum / divisor as f32))
            })
            .collect();

        debug!("aggregated vectors for {} / {} keywords", kv.len(), corpus.keywords().len());

        Ok(kv)
    }

}
