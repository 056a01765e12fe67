
// imports
use crate::aggregate::AverageMode;

use std::error::Error;
use std::fmt::Display;
use std::fs;

use serde_json::Value;


#[derive(Clone, Debug)]
pub struct JsonVectors {
    pub vectors_file: String,
    pub tokens_file: String,
    pub unknown_token: String,
}

impl Display for JsonVectors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "token vector files:
        vectors_file: {},
        tokens_file: {},
        unknown_token: {}",
        self.vectors_file, self.tokens_file, self.unknown_token
        )
    }
}

#[derive(Clone, Debug)]
pub struct JsonParams {
    pub corpus_file: String,
    pub output_dir: String,
    pub keywords: Vec<String>,
    pub case_sensitive: bool,
    pub chunk_size: usize,
    pub corpus_workers: usize,
    pub average_mode: AverageMode,
    pub saved_corpus: Option<bool>,
    pub json_vectors: JsonVectors,
}

impl Display for JsonParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using hyper-params:
        corpus_file: {}
        output_dir: {}
        keywords: {:?}
        case_sensitive: {}
        chunk_size: {}
        corpus_workers: {}
        average_mode: {:?}
        saved_corpus: {:?}
        Using {}",
        self.corpus_file, self.output_dir, self.keywords, self.case_sensitive,
        self.chunk_size, self.corpus_workers, self.average_mode, self.saved_corpus,
        self.json_vectors)
    }
}

pub struct Config {
    params: JsonParams
}

impl Config {

    pub fn get_params(&self) -> JsonParams {
        return self.params.clone()
    }

    pub fn new(args: &[String]) -> Result<Config, Box<dyn Error>> {

        if args.len() != 2 {
            return Err(format!("input should be a path to json file only").into());
        }

        // parse input json
        let f = fs::File::open(&args[1]).expect("cannot open json file");
        let json: Value = serde_json::from_reader(f).expect("cannot read json file");

        // validate required fields
        let corpus_file = json.get("corpus_file").expect("corpus_file was not supplied through json").as_str().expect("cannot cast corpus_file to string");
        let output_dir = json.get("output_dir").expect("output_dir was not supplied through json").as_str().expect("cannot cast output_dir to string");
        let keywords: Vec<String> = json.get("keywords").expect("keywords were not supplied through json")
            .as_array().expect("keywords must be an array")
            .iter()
            .map(|k| k.as_str().expect("keywords must be strings").to_owned())
            .collect();
        let vectors_file = json.get("vectors_file").expect("vectors_file was not supplied through json").as_str().expect("cannot cast vectors_file to string");
        let tokens_file = json.get("tokens_file").expect("tokens_file was not supplied through json").as_str().expect("cannot cast tokens_file to string");

        // handle default vs input parameters
        let case_sensitive = match json.get("case_sensitive") {
            Some(case_sensitive) => case_sensitive.as_bool().expect("panic since given case_sensitive is not boolean"),
            None => false
        };
        let chunk_size = match json.get("chunk_size") {
            Some(chunk_size) => chunk_size.as_i64().expect("panic since given chunk_size is not numeric"),
            None => 256
        };
        let corpus_workers = match json.get("corpus_workers") {
            Some(corpus_workers) => corpus_workers.as_i64().expect("panic since given corpus_workers is not numeric"),
            None => 3
        };
        let saved_corpus = match json.get("saved_corpus") {
            Some(saved_corpus) => Some(saved_corpus.as_bool().expect("panic since given saved_corpus is not boolean")),
            None => None
        };
        let unknown_token = match json.get("unknown_token") {
            Some(unknown_token) => unknown_token.as_str().expect("panic since given unknown_token is not a string"),
            None => "unk"
        };
        let average_mode = match json.get("average_mode") {
            Some(mode) => match mode.as_str().expect("panic since given average_mode is not a string") {
                "all-tokens" => AverageMode::AllTokens,
                "final-sentence" => AverageMode::FinalSentence,
                other => return Err(format!("unrecognized average_mode {}", other).into())
            },
            None => AverageMode::AllTokens
        };

        let params = JsonParams {
            corpus_file: corpus_file.to_owned(),
            output_dir: output_dir.to_owned(),
            keywords: keywords,
            case_sensitive: case_sensitive,
            chunk_size: chunk_size as usize,
            corpus_workers: corpus_workers as usize,
            average_mode: average_mode,
            saved_corpus: saved_corpus,
            json_vectors: JsonVectors {
                vectors_file: vectors_file.to_owned(),
                tokens_file: tokens_file.to_owned(),
                unknown_token: unknown_token.to_owned()
            }
        };

        Ok (
            Self {
                params: params
            }
        )
    }

}


pub mod files_handling {

    use crate::corpus::KeywordCorpus;

    use std::collections::HashMap;
    use std::error::Error;
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Read};

    use flate2::read::GzDecoder;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use ndarray::{Array1, Array2};
    use ndarray_npy::{read_npy, write_npy, ReadNpyError};

    pub fn read_input<R: ReadFile>(file_path: &str) -> Result<<R as ReadFile>::Item, <R as ReadFile>::Error> {
        let input = <R as ReadFile>::read_file(file_path)?;
        Ok(input)
    }

    pub fn save_output<S: SaveFile>(output_dir: &str, file_name: &str, item: S) -> Result<(), <S as SaveFile>::Error> {

        // create output folder
        if let Err(e) = fs::create_dir_all(output_dir) {
            panic!("{}", e)
        }

        item.save_file(output_dir, file_name)?;
        return Ok(())

    }

    pub trait ReadFile {
        type Error;
        type Item;
        fn read_file(file_path: &str) -> Result<Self::Item, Self::Error>;
    }

    pub trait SaveFile {
        type Error;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error>;
    }

    impl ReadFile for Array2<f32> {
        type Error = ReadNpyError;
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item, Self::Error> {
            let in_file = file_path.to_string() + ".npy";
            let item = read_npy(in_file)?;
            Ok(item)
        }
    }

    impl SaveFile for Array2<f32> {
        type Error = Box<dyn Error>;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error> {
            let out = output_dir.to_string() + "/" + file_name + ".npy";
            write_npy(out, self)?;
            Ok(())
        }
    }

    impl ReadFile for HashMap<String, usize> {
        type Error = std::io::Error;
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item, Self::Error> {
            let in_file = file_path.to_string() + ".txt";
            let f = File::open(in_file)?;
            let item = serde_json::from_reader(f)?;
            return Ok(item)
        }
    }

    impl SaveFile for HashMap<String, usize> {
        type Error = std::io::Error;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error> {
            let out = output_dir.to_string() + "/" + file_name + ".txt";
            let f = File::create(out)?;
            serde_json::to_writer(f, self)?;
            return Ok(())
        }
    }

    // the keyword corpus can be large, it is saved as gzipped bincode
    impl ReadFile for KeywordCorpus {
        type Error = Box<dyn Error>;
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item, Self::Error> {

            let in_file = file_path.to_string() + ".bin.gz";
            let f = BufReader::new(File::open(in_file)?);
            let mut reader = GzDecoder::new(f);
            let mut buf: Vec<u8> = Vec::new();
            reader.read_to_end(&mut buf)?;
            let item: KeywordCorpus = bincode::deserialize(&buf)?;
            Ok(item)
        }
    }

    impl SaveFile for KeywordCorpus {
        type Error = Box<dyn Error>;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error> {

            let out = output_dir.to_string() + "/" + file_name + ".bin.gz";
            let f = BufWriter::new(File::create(out)?);
            let mut writer = GzEncoder::new(f, Compression::default());
            bincode::serialize_into(&mut writer, self)?;
            writer.finish()?;
            Ok(())
        }
    }

    // csv export of the aggregated keyword vectors, one row per keyword in
    // the order given by the caller
    impl SaveFile for Vec<(String, Array1<f32>)> {
        type Error = Box<dyn Error>;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error> {

            let out = output_dir.to_string() + "/" + file_name + ".csv";
            let mut wrt = csv::WriterBuilder::new().from_path(out)?;

            for (keyword, vector) in self {
                let mut record: Vec<String> = vec![keyword.to_owned()];
                record.extend(vector.iter().map(|v| v.to_string()));
                wrt.write_record(&record)?;
            }
            wrt.flush()?;
            Ok(())
        }
    }

}


#[cfg(test)]
mod tests {

    use super::files_handling;
    use super::Config;
    use crate::aggregate::AverageMode;
    use crate::corpus::{KeywordCorpus, KeywordCorpusBuilder, Sentence};
    use ndarray::{array, Array1};
    use std::fs;
    use std::io::Write;

    fn to_sentences(lines: &[&str]) -> Vec<Sentence> {
        lines
            .iter()
            .map(|line| line.split_whitespace().map(|t| t.to_string()).collect())
            .collect()
    }

    #[test]
    fn corpus_save_load_round_trip() {

        let keywords = vec!["malware".to_string(), "exploit".to_string()];
        let builder = KeywordCorpusBuilder::new(&keywords, false).unwrap();
        let corpus = builder
            .create(&to_sentences(&["a malware attack", "an exploit chain"]), 256, 1)
            .unwrap();

        let dir = std::env::temp_dir().join("sec2vec_corpus_round_trip");
        let dir = dir.to_str().unwrap().to_string();
        files_handling::save_output::<KeywordCorpus>(&dir, "kc", corpus.clone()).unwrap();

        let path = dir + "/kc";
        let loaded = files_handling::read_input::<KeywordCorpus>(&path).unwrap();
        assert_eq!(loaded, corpus);
    }

    #[test]
    fn csv_export_preserves_row_order() {

        // rows land in the csv exactly as ordered, rerunning gives the same file
        let rows: Vec<(String, Array1<f32>)> = vec![
            ("zeta".to_string(), array![1.0, 2.0]),
            ("alpha".to_string(), array![3.0, 4.0]),
        ];

        let dir = std::env::temp_dir().join("sec2vec_csv_order");
        let dir = dir.to_str().unwrap().to_string();
        files_handling::save_output::<Vec<(String, Array1<f32>)>>(&dir, "kv", rows).unwrap();

        let contents = fs::read_to_string(dir + "/kv.csv").unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["zeta,1,2", "alpha,3,4"]);
    }

    #[test]
    fn config_defaults_and_required_fields() {

        let dir = std::env::temp_dir().join("sec2vec_config_test");
        fs::create_dir_all(&dir).unwrap();
        let json_path = dir.join("args.json");
        let mut f = fs::File::create(&json_path).unwrap();
        write!(
            f,
            r#"{{
                "corpus_file": "Input/corpus.txt",
                "output_dir": "Output",
                "keywords": ["malware", "exploit"],
                "vectors_file": "Output/vecs",
                "tokens_file": "Output/words",
                "chunk_size": 64
            }}"#
        )
        .unwrap();

        let args = vec!["prog".to_string(), json_path.to_str().unwrap().to_string()];
        let params = Config::new(&args).unwrap().get_params();

        assert_eq!(params.keywords, vec!["malware".to_string(), "exploit".to_string()]);
        assert_eq!(params.chunk_size, 64);
        // defaults
        assert_eq!(params.corpus_workers, 3);
        assert!(!params.case_sensitive);
        assert_eq!(params.average_mode, AverageMode::AllTokens);
        assert_eq!(params.json_vectors.unknown_token, "unk");
        assert!(params.saved_corpus.is_none());
    }

}
