pub mod processor;

pub use processor::{PdfError, PdfInfo, PdfProcessor, TextExtractor};
