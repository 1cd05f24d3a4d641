mod csv;
mod share;

pub use csv::{CsvError, CsvRow, parse_csv};
pub use share::{
    URL_PARAM, URL_SIZE_WARNING_CHARS, base64_to_features, decode_url_to_features,
    encode_features_to_url, features_to_base64,
};
