//! Retrieval-augmented answering

mod retrieval;

pub use retrieval::{format_context, RetrievalChain, RetrievedDocument, RETRIEVAL_ERROR_MESSAGE};
