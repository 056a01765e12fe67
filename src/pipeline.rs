
// imports
use crate::aggregate::Aggregate;
use crate::config::{files_handling, Config};
use crate::corpus::{KeywordCorpus, KeywordCorpusBuilder, SentenceLoader};
use crate::vectors::TokenVectors;

use core::panic;
use std::collections::HashMap;
use std::env;
use std::time::Instant;

use log::info;
use ndarray::{Array1, Array2};

pub struct Pipeline {}

impl Pipeline {

    // runs the main procedure of 3 steps -
    // -> configuration of arguments
    // -> keyword corpus construction
    // -> aggregation of token vectors into keyword vectors

    pub fn run() {

        info!("entering program...");
        let args: Vec<String> = env::args().collect();

        info!("building parameters...");
        let params = match Config::new(&args) {
            Ok(config) => config.get_params(),
            Err(e) => panic!("{}", e)
        };

        // build the keyword corpus if not saved and given already
        let corpus: KeywordCorpus = if params.saved_corpus.is_none() || params.saved_corpus.unwrap() == false {

            let timer = Instant::now();
            info!("{}", params);
            info!("starting keyword corpus construction...");

            let sentences = match SentenceLoader::load(&params.corpus_file) {
                Ok(sentences) => sentences,
                Err(e) => panic!("{}", e)
            };
            let builder = match KeywordCorpusBuilder::new(&params.keywords, params.case_sensitive) {
                Ok(builder) => builder,
                Err(e) => panic!("{}", e)
            };
            let corpus = match builder.create(&sentences, params.chunk_size, params.corpus_workers) {
                Ok(corpus) => corpus,
                Err(e) => panic!("{}", e)
            };

            if let Err(e) = files_handling::save_output::<KeywordCorpus>(&params.output_dir, "kc", corpus.clone()) {
                panic!("{}", e)
            }
            info!("finished corpus construction and saved it, took {} seconds ...", timer.elapsed().as_secs());

            corpus

        } else {

            // the corpus was saved by an earlier run, load it
            let kc_path = (&params.output_dir).to_string() + "/kc";
            match files_handling::read_input::<KeywordCorpus>(&kc_path) {
                Ok(corpus) => corpus,
                Err(e) => panic!("{}", e)
            }
        };

        // run aggregation part
        let timer = Instant::now();
        info!("starting aggregation part...");

        // token vectors were trained and saved by the external trainer, load them
        let vectors = match TokenVectors::load(
            &params.json_vectors.vectors_file,
            &params.json_vectors.tokens_file,
            &params.json_vectors.unknown_token,
        ) {
            Ok(vectors) => vectors,
            Err(e) => panic!("{}", e)
        };

        let kv = match Aggregate::run(&corpus, &vectors, params.average_mode) {
            Ok(kv) => kv,
            Err(e) => panic!("{}", e)
        };

        // lay the keyword vectors into a matrix behind a keyword index, in the
        // configured keyword order so reruns produce identical files
        let mut k2i: HashMap<String, usize> = HashMap::new();
        let mut rows: Vec<(String, Array1<f32>)> = Vec::new();
        for keyword in corpus.keywords() {
            if let Some(vector) = kv.get(keyword) {
                k2i.insert(keyword.to_owned(), rows.len());
                rows.push((keyword.to_owned(), vector.to_owned()));
            }
        }
        let mut w: Array2<f32> = Array2::zeros((rows.len(), vectors.dim()));
        for (i, (_keyword, vector)) in rows.iter().enumerate() {
            w.row_mut(i).assign(vector);
        }

        // save the keyword vectors, the keyword index, and a csv export
        if let Err(e) = files_handling::save_output::<Array2<f32>>(&params.output_dir, "kv", w) { panic!("{}", e) }
        if let Err(e) = files_handling::save_output::<HashMap<String, usize>>(&params.output_dir, "keywords", k2i) { panic!("{}", e) }
        if let Err(e) = files_handling::save_output::<Vec<(String, Array1<f32>)>>(&params.output_dir, "kv", rows) { panic!("{}", e) }

        info!("finished aggregation, saved keyword vectors. Took {} seconds ...", timer.elapsed().as_secs());

    }

}
