
// imports
use crate::config::files_handling;
use crate::error::Sec2VecError;

use std::collections::HashMap;
use std::error::Error;

use log::info;
use ndarray::{Array2, ArrayView1};


// token -> vector lookup produced by the external embedding model: a token
// index over the rows of a weight matrix, plus a reserved unknown-token symbol
// whose row serves as the out-of-vocabulary fallback.
#[derive(Clone, Debug)]
pub struct TokenVectors {
    t2i: HashMap<String, usize>,
    w: Array2<f32>,
    unknown: String,
}

impl TokenVectors {

    pub fn new(t2i: HashMap<String, usize>, w: Array2<f32>, unknown: &str) -> TokenVectors {

        assert_eq!(
            t2i.len(), w.dim().0,
            "inconsistent number of entries in w and tokens"
        );

        Self { t2i, w, unknown: unknown.to_owned() }
    }

    // reads the external trainer's artifacts: an npy weight matrix and a json
    // token index, the way the trainer saved them
    pub fn load(vectors_path: &str, tokens_path: &str, unknown: &str) -> Result<TokenVectors, Box<dyn Error>> {

        let w = files_handling::read_input::<Array2<f32>>(vectors_path)?;
        let t2i = files_handling::read_input::<HashMap<String, usize>>(tokens_path)?;
        info!("loaded {} token vectors of dim {}", w.dim().0, w.dim().1);

        Ok(TokenVectors::new(t2i, w, unknown))
    }

    pub fn dim(&self) -> usize {
        self.w.dim().1
    }

    pub fn contains(&self, token: &str) -> bool {
        self.t2i.contains_key(token)
    }

    pub fn get(&self, token: &str) -> Option<ArrayView1<f32>> {
        self.t2i.get(token).map(|i| self.w.row(*i))
    }

    // the out-of-vocabulary fallback row. its presence is a configuration
    // invariant of the external model, checked before any aggregation.
    pub fn unknown_row(&self) -> Result<ArrayView1<f32>, Sec2VecError> {
        self.get(&self.unknown)
            .ok_or_else(|| Sec2VecError::MissingFallback(self.unknown.to_owned()))
    }

}
