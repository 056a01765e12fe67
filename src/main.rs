
extern crate sec2vec;
use sec2vec::Pipeline;

fn main() {
    env_logger::init();
    Pipeline::run();
}
