// Extraction stage — one module per input format.
//
// `pdf_text` is the document-format boundary on the response side;
// everything downstream of it works on plain text and markup strings.

pub mod answer_key;
pub mod pdf_text;
pub mod response;

pub use answer_key::AnswerKeyExtractor;
pub use pdf_text::{LopdfTextSource, PlainTextSource, TextSource};
