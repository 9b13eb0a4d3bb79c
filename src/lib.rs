// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # interop-eval
//!
//! Decides whether the communication needs of an interoperability model can
//! be met: for each need, whether some pair of its actors is connected by a
//! hop-by-hop path of reliable actors and carriers that share a usable
//! language and can address each other.
//!
//! ## Architecture
//!
//! - **Entity model** (`entity`, `graph`): typed entities in a `petgraph` graph with role-qualified associations
//! - **Language closures** (`closure`): generalization and encapsulation hierarchies
//! - **Hop resolvers** (`language`, `addressing`): usable languages and addressability across one hop
//! - **Path search** (`search`): depth-first search over an explicit frame stack
//! - **Evaluation** (`evaluator`, `diagnostics`, `multiplicity`): per-need satisfiability, root causes, structural checks
//! - **Host surface** (`model`, `config`, `render`, `export`, `run`): JSON models, TOML config, reports
//!
//! ## Library usage
//!
//! ```
//! use interop_eval::entity::{ActorAttrs, CarrierAttrs, Role};
//! use interop_eval::evaluator::{EvalSettings, evaluate_all};
//! use interop_eval::graph::EntityGraph;
//!
//! let mut g = EntityGraph::new();
//! let modbus = g.add_language("Modbus");
//! let serial = g.add_carrier("RS-485", CarrierAttrs { fixed: true, ..Default::default() });
//! g.associate_roles(serial, None, modbus, Some(Role::Format));
//!
//! let need = g.add_need("poll");
//! g.associate(need, modbus);
//! for name in ["SCADA", "RTU"] {
//!     let actor = g.add_actor(name, ActorAttrs::default());
//!     g.associate(actor, modbus);
//!     g.associate(actor, serial);
//!     g.associate(need, actor);
//! }
//!
//! let report = evaluate_all(&mut g, &EvalSettings::default());
//! assert!(report.needs[0].satisfied);
//! assert!(g.is_satisfied(need));
//! ```

pub mod addressing;
pub mod closure;
pub mod config;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod evaluator;
pub mod export;
pub mod graph;
pub mod language;
pub mod model;
pub mod multiplicity;
pub mod render;
pub mod run;
pub mod search;
