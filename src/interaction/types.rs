// Events the interaction loop consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Raw form fields; validation happens in the loop.
    Connect { address: String, port: String },
    ReadInfo,
    CreateImage,
    TransferImage,
    Help,
    Unknown(String),
    Exit, // explicit exit or the input stream closing
}
