// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV decoding: bytes in, raw rows out

mod csv_parser;

pub use csv_parser::CsvParser;
