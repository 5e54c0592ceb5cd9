pub mod pipeline;
pub mod reply;

pub use pipeline::{
    ConversionRequest, ConvertedFile, Converter, ConvertError, Delivery, DeliveryError,
    Dispatcher, IncomingDocument, RequestOutcome,
};
