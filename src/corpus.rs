
// imports
use crate::error::Sec2VecError;

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};

use log::info;
use rayon::{prelude::*, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

pub type Sentence = Vec<String>;


pub struct SentenceLoader {}

impl SentenceLoader {

    fn read_file(file_path: &str) -> Result<Lines<BufReader<File>>, Box<dyn Error>> {

        match File::open(file_path) {
            Ok(f) => Ok(io::BufReader::new(f).lines()),
            Err(e) => Err(Box::new(e))
        }
    }

    // line is a string of text, trimmed for trailing and leading spaces.
    // casing is left untouched, the case policy is applied at matching time.
    fn parse_line(line: &str) -> Sentence {
        SentenceLoader::tokenize(line.trim())
    }

    pub fn load(file_path: &str) -> Result<Vec<Sentence>, Box<dyn Error>> {

        // read corpus lines, parse into token sequences, skip empty lines
        let mut sentences: Vec<Sentence> = Vec::new();
        let lines = SentenceLoader::read_file(file_path)?;
        for line in lines {
            let sentence = SentenceLoader::parse_line(&line?);
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
        }
        Ok(sentences)
    }

}

// defines the behavior needed for tokenizing a corpus
trait Tokenizer {
    fn tokenize(sequence: &str) -> Sentence;
}

impl Tokenizer for SentenceLoader {
    // simple tokenizer by whitespace split
    fn tokenize(sequence: &str) -> Sentence {
        return sequence.split_whitespace().map(|x| x.to_string()).collect();
    }
}


// keyword -> ordered sentences that mention it. `keywords` keeps the configured
// order so flattening the corpus is deterministic (HashMap iteration is not).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeywordCorpus {
    keywords: Vec<String>,
    sentences: HashMap<String, Vec<Sentence>>,
}

impl KeywordCorpus {

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn get(&self, keyword: &str) -> Option<&Vec<Sentence>> {
        self.sentences.get(keyword)
    }

    // number of sentences collected over all keywords (a sentence mentioning
    // two keywords counts twice)
    pub fn n_sentences(&self) -> usize {
        self.keywords.iter().map(|k| self.sentences[k].len()).sum()
    }

    // sentences in keyword-then-sentence order
    pub fn iter_sentences(&self) -> impl Iterator<Item = &Sentence> + '_ {
        self.keywords
            .iter()
            .flat_map(move |keyword| self.sentences.get(keyword).into_iter().flatten())
    }

    // the flattened token stream fed to vocabulary building
    pub fn iter_tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter_sentences()
            .flat_map(|sentence| sentence.iter().map(String::as_str))
    }

}


pub struct KeywordCorpusBuilder {
    keywords: Vec<String>,
    case_sensitive: bool,
}

impl KeywordCorpusBuilder {

    pub fn new(keywords: &[String], case_sensitive: bool) -> Result<KeywordCorpusBuilder, Sec2VecError> {

        if keywords.is_empty() {
            return Err(Sec2VecError::EmptyKeywords);
        }

        // dedupe while keeping the configured order
        let mut unique: Vec<String> = Vec::new();
        for keyword in keywords {
            if !unique.contains(keyword) {
                unique.push(keyword.to_owned());
            }
        }

        Ok(Self { keywords: unique, case_sensitive })
    }

    // token-equality membership test under the configured case policy
    fn mentions(&self, sentence: &[String], keyword: &str) -> bool {

        if self.case_sensitive {
            sentence.iter().any(|token| token == keyword)
        } else {
            let keyword = keyword.to_lowercase();
            sentence.iter().any(|token| token.to_lowercase() == keyword)
        }
    }

    // scan one chunk of sentences, keeping the in-chunk order
    fn scan_chunk(&self, chunk: &[Sentence]) -> HashMap<String, Vec<Sentence>> {

        let mut partial: HashMap<String, Vec<Sentence>> =
            self.keywords.iter().map(|k| (k.to_owned(), Vec::new())).collect();

        for sentence in chunk {
            for keyword in &self.keywords {
                // membership, not count: a repeated mention still appends once
                if self.mentions(sentence, keyword) {
                    partial.get_mut(keyword).unwrap().push(sentence.to_owned());
                }
            }
        }

        partial
    }

    // scans the sentences in parallel chunks of `chunk_size` on a pool of
    // `workers` threads. rayon collects mapped chunks back in input order, so
    // merging chunk by chunk preserves the original sentence positions and the
    // result is identical to a sequential scan.
    pub fn create(&self, sentences: &[Sentence], chunk_size: usize, workers: usize) -> Result<KeywordCorpus, Box<dyn Error>> {

        let chunk_size = chunk_size.max(1);
        let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;

        let partials: Vec<HashMap<String, Vec<Sentence>>> = pool.install(|| {
            sentences
                .par_chunks(chunk_size)
                .map(|chunk| self.scan_chunk(chunk))
                .collect()
        });

        // merge partial results back into global sentence order
        let mut merged: HashMap<String, Vec<Sentence>> =
            self.keywords.iter().map(|k| (k.to_owned(), Vec::new())).collect();
        for mut partial in partials {
            for keyword in &self.keywords {
                if let Some(found) = partial.get_mut(keyword) {
                    merged.get_mut(keyword).unwrap().append(found);
                }
            }
        }

        let corpus = KeywordCorpus {
            keywords: self.keywords.clone(),
            sentences: merged,
        };

        info!(
            "built keyword corpus: {} keywords, {} collected sentences out of {} scanned",
            corpus.keywords.len(), corpus.n_sentences(), sentences.len()
        );

        Ok(corpus)
    }

}


#[cfg(test)]
mod tests {

    use super::{KeywordCorpusBuilder, Sentence, SentenceLoader};
    use crate::error::Sec2VecError;
    use std::fs;
    use std::io::Write;

    fn to_sentences(lines: &[&str]) -> Vec<Sentence> {
        lines
            .iter()
            .map(|line| line.split_whitespace().map(|t| t.to_string()).collect())
            .collect()
    }

    fn to_keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn loader_trims_lines_and_skips_empty_ones() {

        let dir = std::env::temp_dir().join("sec2vec_loader_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("corpus.txt");
        let mut f = fs::File::create(&path).unwrap();
        write!(f, "  a malware attack  \n\n   \nan exploit chain\n").unwrap();

        let sentences = SentenceLoader::load(path.to_str().unwrap()).unwrap();
        assert_eq!(sentences, to_sentences(&["a malware attack", "an exploit chain"]));
    }

    #[test]
    fn empty_keyword_set_is_rejected() {
        let err = KeywordCorpusBuilder::new(&[], false).err().unwrap();
        assert_eq!(err, Sec2VecError::EmptyKeywords);
    }

    #[test]
    fn grouping_by_keyword() {

        // sentences that mention no keyword are silently excluded from all lists
        let keywords = to_keywords(&["malware", "exploit"]);
        let sentences = to_sentences(&[
            "a malware attack",
            "an exploit chain",
            "benign text",
        ]);

        let builder = KeywordCorpusBuilder::new(&keywords, false).unwrap();
        let corpus = builder.create(&sentences, 256, 1).unwrap();

        assert_eq!(corpus.get("malware").unwrap(), &to_sentences(&["a malware attack"]));
        assert_eq!(corpus.get("exploit").unwrap(), &to_sentences(&["an exploit chain"]));
        assert_eq!(corpus.n_sentences(), 2);
    }

    #[test]
    fn unmentioned_keyword_keeps_empty_entry() {

        let keywords = to_keywords(&["malware", "ransomware"]);
        let sentences = to_sentences(&["a malware attack"]);

        let builder = KeywordCorpusBuilder::new(&keywords, false).unwrap();
        let corpus = builder.create(&sentences, 256, 1).unwrap();

        assert!(corpus.get("ransomware").unwrap().is_empty());
        assert_eq!(corpus.keywords().len(), 2);
    }

    #[test]
    fn case_policy() {

        let keywords = to_keywords(&["Malware"]);
        let sentences = to_sentences(&["a malware attack"]);

        // case-insensitive: token and keyword are lowercased before comparing
        let insensitive = KeywordCorpusBuilder::new(&keywords, false).unwrap();
        let corpus = insensitive.create(&sentences, 256, 1).unwrap();
        assert_eq!(corpus.get("Malware").unwrap().len(), 1);

        // case-sensitive: exact token equality only
        let sensitive = KeywordCorpusBuilder::new(&keywords, true).unwrap();
        let corpus = sensitive.create(&sentences, 256, 1).unwrap();
        assert!(corpus.get("Malware").unwrap().is_empty());
    }

    #[test]
    fn repeated_mention_appends_once() {

        let keywords = to_keywords(&["malware"]);
        let sentences = to_sentences(&["malware calls malware over malware"]);

        let builder = KeywordCorpusBuilder::new(&keywords, false).unwrap();
        let corpus = builder.create(&sentences, 256, 1).unwrap();
        assert_eq!(corpus.get("malware").unwrap().len(), 1);
    }

    #[test]
    fn sentence_with_two_keywords_joins_both_lists() {

        let keywords = to_keywords(&["malware", "exploit"]);
        let sentences = to_sentences(&["malware uses an exploit"]);

        let builder = KeywordCorpusBuilder::new(&keywords, false).unwrap();
        let corpus = builder.create(&sentences, 256, 1).unwrap();
        assert_eq!(corpus.get("malware").unwrap().len(), 1);
        assert_eq!(corpus.get("exploit").unwrap().len(), 1);
    }

    #[test]
    fn result_is_invariant_to_chunking_and_workers() {

        let keywords = to_keywords(&["alpha", "beta"]);
        let sentences = to_sentences(&[
            "alpha one", "beta two", "alpha three", "nothing here",
            "beta four alpha", "alpha five", "beta six", "alpha seven",
        ]);

        let builder = KeywordCorpusBuilder::new(&keywords, false).unwrap();
        let sequential = builder.create(&sentences, sentences.len(), 1).unwrap();

        for chunk_size in [1, 2, 3, 5] {
            for workers in [1, 2, 4] {
                let parallel = builder.create(&sentences, chunk_size, workers).unwrap();
                assert_eq!(parallel, sequential, "chunk_size={} workers={}", chunk_size, workers);
            }
        }
    }

    #[test]
    fn token_stream_follows_keyword_then_sentence_order() {

        let keywords = to_keywords(&["b", "a"]);
        let sentences = to_sentences(&["a one", "b two", "a three"]);

        let builder = KeywordCorpusBuilder::new(&keywords, false).unwrap();
        let corpus = builder.create(&sentences, 2, 2).unwrap();

        let stream: Vec<&str> = corpus.iter_tokens().collect();
        assert_eq!(stream, vec!["b", "two", "a", "one", "a", "three"]);
    }

    #[test]
    fn duplicate_keywords_are_deduped() {
        let keywords = to_keywords(&["malware", "malware"]);
        let builder = KeywordCorpusBuilder::new(&keywords, false).unwrap();
        let corpus = builder.create(&to_sentences(&["a malware attack"]), 256, 1).unwrap();
        assert_eq!(corpus.keywords().len(), 1);
    }

}
