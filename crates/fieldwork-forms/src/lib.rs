//! Declarative form-definition model for the fieldwork compiler.
//!
//! A form is described as a tree of [`Journey`]s, [`Step`]s and [`Block`]s,
//! decorated with [`Expr`]essions wherever a property should be computed at
//! runtime rather than stated literally. Definitions carry no identity and no
//! compile-time metadata; they are plain data, cheap to clone, and round-trip
//! through serde. The `fieldwork-compiler` crate interns a definition into an
//! id-bearing syntax tree and compiles it into a dependency graph.
//!
//! ## Building definitions
//!
//! Definitions are usually assembled through the chaining constructors:
//!
//! ```
//! use fieldwork_forms::{Block, Expr, Function, Journey, Step};
//!
//! let journey = Journey::new("Personal details")
//!     .step(
//!         Step::new("/name").block(
//!             Block::field("text_input", "first_name")
//!                 .formatter(Function::transformer("trim")),
//!         ),
//!     );
//! assert_eq!(journey.steps.len(), 1);
//! ```
//!
//! Every field is public, so a definition can equally be written as a plain
//! struct literal or deserialized from JSON.

mod definition;
mod expr;

pub use self::definition::{Block, BlockKind, Journey, Step, Transition, Validation};
pub use self::expr::{Branch, Expr, Function, FunctionKind, Value};

/// Ordered map used for records and component property bags.
pub use indexmap::IndexMap;
