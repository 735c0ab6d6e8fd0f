#![doc = r"Server side of Ember: node trees to markup, markup to documents, requests to responses."]

pub mod document;
pub mod error;
pub mod escape;
pub mod markup;
pub mod server;

pub use document::{extract_initial_state, extract_root_markup, DocumentTemplate};
pub use error::{SsrError, SsrResult};
pub use escape::escape_html;
pub use markup::{serialize, MarkupRenderer};
pub use server::{
    LoaderResult, PropsContext, RenderOutput, ServerProps, SsrContext, SsrRequest, SsrResponse,
    SsrServer,
};
