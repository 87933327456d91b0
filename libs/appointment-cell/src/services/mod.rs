pub mod agenda;
pub mod booking;
pub mod lifecycle;

pub use agenda::AgendaService;
pub use booking::BookingService;
pub use lifecycle::LifecycleService;
