//! One handler per supported activity shape.

pub mod consignment;
pub mod document;
pub mod event;

pub use consignment::handle_consignment_create;
pub use document::{handle_document_add, DocumentAdded, DocumentDeps};
pub use event::{handle_event_add, EventAdded, EventDeps};
