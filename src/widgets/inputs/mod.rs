pub mod checkbox;
pub mod number;
pub mod select;
pub mod text;
pub mod text_edit;

pub use checkbox::CheckboxInput;
pub use number::{FloatInput, IntInput};
pub use select::EnumSelect;
pub use text::TextInput;
