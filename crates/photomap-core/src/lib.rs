pub mod imaging;
pub mod layout;
