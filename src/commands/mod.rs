pub mod build_cache;
pub mod crack;
pub mod dump_hashes;
pub mod dump_ngrams;
pub mod dump_words;
