//! Built-in widgets proving the construct/style contracts.
//!
//! Applications are expected to bring their own widget types; these two
//! cover the common cases and double as reference implementations of the
//! [`Widget`](crate::widget::Widget) trait.

pub mod button;
pub mod checkbox;

pub use button::Button;
pub use checkbox::Checkbox;
