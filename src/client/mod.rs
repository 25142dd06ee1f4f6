//! Editor-side trigger for previews: debounced, cancellable calls to the preview endpoint.

mod debounce;
mod transport;

pub use debounce::{DEFAULT_DEBOUNCE, LOADING_MESSAGE, PreviewDebouncer, PreviewState};
pub use transport::{
    ClientPreviewRequest, HttpPreviewTransport, PreviewTransport, TransportError,
};
