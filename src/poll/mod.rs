mod controller;
mod visibility;

pub use controller::PollController;
pub use visibility::VisibilitySignal;
