mod echo;
mod memory;
mod web;

pub use echo::EchoBrain;
pub use memory::InMemoryUserState;
pub use web::WebMessagingAdapter;
