mod nip_05_id;
mod pin;

pub use nip_05_id::Nip05Id;
pub use pin::Pin;
