//! GFM task list items: `* [x] done`, `* [ ] todo`.
//!
//! Two adapters connect the checkbox syntax to the `checked` field of [`ListItem`]:
//!
//! - [`TaskListItemFromMarkdown`] hooks into the tree builder. It records the state of a
//!   checkbox token on the enclosing list item and removes the separator left at the start of
//!   the item's first paragraph.
//! - [`TaskListItemToMarkdown`] hooks into the serializer. It writes `[x] ` or `[ ] ` after the
//!   bullet of items whose `checked` is set and whose first child is a paragraph.
//!
//! The adapters share no state: the tree's `checked` field is the only link between them.
//!
//! [`ListItem`]: crate::ir::nodes::ListItem

mod from_markdown;
mod to_markdown;

pub use from_markdown::TaskListItemFromMarkdown;
pub use to_markdown::TaskListItemToMarkdown;
