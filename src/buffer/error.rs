use thiserror::Error;

/// Reasons a message is refused before it reaches the queue.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("A value must be provided")]
    MissingValue,

    #[error("A non-empty JSON object must be provided")]
    EmptyMessage,

    #[error(
        "Both \"path\" and \"value\" properties must be provided in the message object to send Graphite metrics"
    )]
    MissingGraphiteFields,

    #[error(
        "All \"intrinsic_tags\", \"meta_tags\" and \"value\" properties must be provided in the message object to send Carbon2 metrics"
    )]
    MissingCarbon2Fields,
}
