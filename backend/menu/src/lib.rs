//! # Menu
//!
//! Shared model and client-side logic of the Mhanna menu site.
//!
//! ## Pages
//! - Public menu: items by category, a cart, checkout through a WhatsApp deep link
//! - Admin: login, create/edit/delete items, drag rows to reorder them
//!
//! ## Ordering
//! Items carry two numbers: `item_order` inside their category and `category_order`
//! for the category itself. Every reorder recomputes both from the on-screen list,
//! see [`ordering`]. Batches are cleaned by [`validate`] before they are stored.
//!
//! ## Reorder Contract
//! `PUT /api/items/reorder` with a bare JSON array, every entry carrying both fields.
//! ```json
//! [
//!     { "id": 3, "item_order": 1, "category_order": 1 },
//!     { "id": 1, "item_order": 2, "category_order": 1 },
//!     { "id": 2, "item_order": 1, "category_order": 2 }
//! ]
//! ```
pub mod cart;
pub mod drag;
pub mod error;
pub mod item;
pub mod ordering;
pub mod remote;
pub mod validate;

pub use error::MenuError;
pub use item::{Item, ItemId, ItemPatch, NewItem, OrderUpdate};
