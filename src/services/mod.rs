pub mod form;
pub mod relay;
pub mod telegram;
